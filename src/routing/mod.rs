//! Path routing from inbound requests to registered relay functions.

mod table;

pub use table::{Route, RouteTable};
