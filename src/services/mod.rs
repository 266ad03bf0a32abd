pub mod availability;
pub mod availability_query;
pub mod booking_draft;
pub mod completion;
pub mod invoice;
pub mod local_time;
pub mod photos;
pub mod pricing;
