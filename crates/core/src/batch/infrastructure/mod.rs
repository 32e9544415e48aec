pub mod pipeline_annotator;
