//! Capacity values as they arrive from the provider, and their coercion into
//! unsigned metrics.

/// A raw capacity measurement.
///
/// Upstream quantities reach the store through several conversions, so the
/// integer width and signedness vary. Anything that is not an integer is kept as
/// `Unsupported` with a description of what was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum CapacityValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    Unsupported(String),
}

impl CapacityValue {
    /// Converts to a metric value. Negative and non-integer values have no metric.
    pub fn to_metric(&self) -> Option<u64> {
        match *self {
            CapacityValue::I8(v) => u64::try_from(v).ok(),
            CapacityValue::I16(v) => u64::try_from(v).ok(),
            CapacityValue::I32(v) => u64::try_from(v).ok(),
            CapacityValue::I64(v) => u64::try_from(v).ok(),
            CapacityValue::Isize(v) => u64::try_from(v).ok(),
            CapacityValue::U8(v) => Some(u64::from(v)),
            CapacityValue::U16(v) => Some(u64::from(v)),
            CapacityValue::U32(v) => Some(u64::from(v)),
            CapacityValue::U64(v) => Some(v),
            CapacityValue::Usize(v) => Some(v as u64),
            CapacityValue::Unsupported(_) => None,
        }
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for CapacityValue {
                fn from(value: $ty) -> Self {
                    CapacityValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_integer! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
}

impl From<&str> for CapacityValue {
    fn from(value: &str) -> Self {
        CapacityValue::Unsupported(format!("text {value:?}"))
    }
}

impl From<String> for CapacityValue {
    fn from(value: String) -> Self {
        CapacityValue::from(value.as_str())
    }
}

impl From<f64> for CapacityValue {
    fn from(value: f64) -> Self {
        CapacityValue::Unsupported(format!("float {value}"))
    }
}
