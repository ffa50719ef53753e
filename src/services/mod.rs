pub(crate) mod aggregator;
pub(crate) mod assembler;
pub(crate) mod errors;
pub(crate) mod grader;
pub(crate) mod question_bank;
pub(crate) mod results;
pub(crate) mod statistics;
