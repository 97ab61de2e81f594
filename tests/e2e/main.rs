mod learning_workflow;
mod screening_workflow;
