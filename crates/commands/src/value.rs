use std::any::{type_name, Any};
use std::fmt;

/// A resolved argument or a leaf's return value.
pub struct Value {
    inner: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Takes the value out, handing it back untouched on a type mismatch.
    pub fn downcast<T: Any>(self) -> Result<T, Value> {
        let type_name = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(inner) => Err(Value { inner, type_name }),
        }
    }
}

macro_rules! debug_known {
    ($value:expr, $f:expr, $( $type:ty ),*) => {
        $(
            if let Some(v) = $value.downcast_ref::<$type>() {
                return fmt::Debug::fmt(v, $f);
            }
        )*
    };
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_known!(self, f, i32, i16, i64, f32, f64, bool, String);
        write!(f, "<{}>", self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_prints_primitives() {
        assert_eq!(format!("{:?}", Value::new(3)), "3");
        assert_eq!(format!("{:?}", Value::new("hi".to_string())), "\"hi\"");
        assert_eq!(format!("{:?}", Value::new(true)), "true");
    }

    #[test]
    fn debug_falls_back_to_type_name() {
        #[allow(dead_code)]
        struct Opaque(u8);
        let value = Value::new(Opaque(1));
        assert!(format!("{:?}", value).ends_with("Opaque>"));
    }

    #[test]
    fn downcast_round_trips_on_mismatch() {
        let value = Value::new(7i16);
        let value = value.downcast::<i32>().unwrap_err();
        assert_eq!(value.type_name(), "i16");
        assert_eq!(value.downcast::<i16>().unwrap(), 7);
    }
}
