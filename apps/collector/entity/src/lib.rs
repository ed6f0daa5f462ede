pub mod apex_popularity;
pub mod top_channel;

pub use apex_popularity::Model as ApexPopularity;
pub use top_channel::Model as TopChannel;
