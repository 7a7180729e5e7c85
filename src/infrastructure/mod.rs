pub mod loading;
pub mod node_client;
pub mod symbol_client;
