pub mod backup;
pub mod job;
pub mod logging;
pub mod notification;
pub mod retention;
