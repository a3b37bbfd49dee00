pub mod company;
pub mod connection;
pub mod dashboard;
pub mod profile;
pub mod request;
pub mod ticket;
pub mod workspace;
