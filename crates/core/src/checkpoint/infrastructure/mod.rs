pub mod json_checkpoint_store;
