use super::{ArrayError, DataType};

/// A trait representing an array element type.
pub trait Element: Copy + Send + Sync + 'static {
    /// The data type of arrays holding this element type.
    const DATA_TYPE: DataType;

    /// Validate the data type.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if the data type is incompatible with [`Element`].
    fn validate_data_type(data_type: &DataType) -> Result<(), ArrayError> {
        if *data_type == Self::DATA_TYPE {
            Ok(())
        } else {
            Err(ArrayError::IncompatibleElementType(
                Self::DATA_TYPE,
                *data_type,
            ))
        }
    }

    /// Convert a slice of elements into native endian bytes.
    fn to_bytes(elements: &[Self]) -> Vec<u8>;

    /// Convert native endian bytes into elements.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the length of `bytes` is not a multiple of the element size or a value is invalid.
    fn from_bytes(bytes: &[u8]) -> Result<Vec<Self>, ArrayError>;
}

impl Element for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    fn to_bytes(elements: &[Self]) -> Vec<u8> {
        elements.iter().map(|&element| u8::from(element)).collect()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Vec<Self>, ArrayError> {
        bytes
            .iter()
            .map(|&byte| match byte {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(ArrayError::InvalidBoolValue(byte)),
            })
            .collect()
    }
}

macro_rules! impl_element_pod {
    ($raw_type:ty, $data_type:expr) => {
        impl Element for $raw_type {
            const DATA_TYPE: DataType = $data_type;

            fn to_bytes(elements: &[Self]) -> Vec<u8> {
                bytemuck::cast_slice(elements).to_vec()
            }

            fn from_bytes(bytes: &[u8]) -> Result<Vec<Self>, ArrayError> {
                let element_size = core::mem::size_of::<Self>();
                if bytes.len() % element_size == 0 {
                    Ok(bytemuck::pod_collect_to_vec(bytes))
                } else {
                    Err(ArrayError::InvalidBytesInputSize(
                        bytes.len(),
                        (bytes.len() / element_size * element_size) as u64,
                    ))
                }
            }
        }
    };
}

impl_element_pod!(i8, DataType::Int8);
impl_element_pod!(i16, DataType::Int16);
impl_element_pod!(i32, DataType::Int32);
impl_element_pod!(i64, DataType::Int64);
impl_element_pod!(u8, DataType::UInt8);
impl_element_pod!(u16, DataType::UInt16);
impl_element_pod!(u32, DataType::UInt32);
impl_element_pod!(u64, DataType::UInt64);
impl_element_pod!(half::f16, DataType::Float16);
impl_element_pod!(half::bf16, DataType::BFloat16);
impl_element_pod!(f32, DataType::Float32);
impl_element_pod!(f64, DataType::Float64);
