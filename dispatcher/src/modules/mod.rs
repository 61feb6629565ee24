pub mod building;
pub mod dispatcher;
