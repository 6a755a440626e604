#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct RowsCount(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct ColumnsCount(pub usize);

/// Milliseconds a driver waits between two animation steps.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct StepInterval(pub u64);
