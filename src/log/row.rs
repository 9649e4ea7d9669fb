use std::fmt;

/// Dimensions of one logged GEMM call, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationDescriptor {
    pub m: u64,
    pub n: u64,
    pub k: u64,
}

impl OperationDescriptor {
    pub fn new(m: u64, n: u64, k: u64) -> Self {
        Self { m, n, k }
    }

    /// Label used as the first report column, e.g. `GEMM Layer (64, 64, 64)`.
    pub fn label(&self) -> String {
        format!("GEMM Layer ({}, {}, {})", self.m, self.n, self.k)
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M={} N={} K={}", self.m, self.n, self.k)
    }
}
