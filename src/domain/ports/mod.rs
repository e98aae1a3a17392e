mod notification_port;
mod remote_store_port;

pub use notification_port::NotificationPort;
pub use remote_store_port::{
    Collection, Direction, Filter, FilterOp, Order, Query, RemoteStorePort,
};
