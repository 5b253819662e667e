use std::fmt;

/// An opaque identifier for a declared type within a [`crate::model::TypeUniverse`].
///
/// Handles are the unit of identity for the whole crate: two handles are equal
/// iff they denote the same declared type. They serve as the validation cache
/// key and as the "have we seen this before" marker during cycle detection.
///
/// The value `0` is reserved and never allocated to a real type; a zero handle
/// always fails resolution with [`crate::Error::TypeNotFound`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeHandle(pub u32);

impl TypeHandle {
    /// Creates a handle from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        TypeHandle(value)
    }

    /// Returns the raw handle value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns true if this is the reserved null handle (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for TypeHandle {
    fn from(value: u32) -> Self {
        TypeHandle(value)
    }
}

impl From<TypeHandle> for u32 {
    fn from(handle: TypeHandle) -> Self {
        handle.0
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle(0x{:08x})", self.0)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_handle_new() {
        let handle = TypeHandle::new(0x42);
        assert_eq!(handle.value(), 0x42);
    }

    #[test]
    fn test_handle_null() {
        assert!(TypeHandle::new(0).is_null());
        assert!(!TypeHandle::new(1).is_null());
    }

    #[test]
    fn test_handle_equality() {
        assert_eq!(TypeHandle::new(7), TypeHandle::new(7));
        assert_ne!(TypeHandle::new(7), TypeHandle::new(8));
    }

    #[test]
    fn test_handle_conversions() {
        let handle: TypeHandle = 0x1234_u32.into();
        assert_eq!(handle.value(), 0x1234);
        let raw: u32 = handle.into();
        assert_eq!(raw, 0x1234);
    }

    #[test]
    fn test_handle_as_map_key() {
        let mut map = HashMap::new();
        map.insert(TypeHandle::new(1), "one");
        map.insert(TypeHandle::new(2), "two");
        assert_eq!(map.get(&TypeHandle::new(1)), Some(&"one"));
        assert_eq!(map.get(&TypeHandle::new(3)), None);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(format!("{}", TypeHandle::new(0xAB)), "0x000000ab");
    }
}
