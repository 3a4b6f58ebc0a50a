//! The flight network: graph model, shared snapshot store and data loading.

mod graph;
mod loader;
mod store;

pub use graph::NetworkGraph;
pub use loader::{
    AirportRecord, FlightRecord, JsonFileSource, LoadError, NetworkData, NetworkSource,
};
pub use store::NetworkStore;
