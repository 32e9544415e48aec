pub mod checkpoint;
pub mod checkpoint_sampler;
pub mod checkpoint_store;
