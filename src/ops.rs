pub mod box_it;
pub mod into_stream;
pub mod on_complete;
pub mod map;
pub mod take_until;
