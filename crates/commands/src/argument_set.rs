use crate::{
    error::{CommandResult, InternalError},
    value::Value,
};
use std::any::{type_name, Any};

/// The resolved arguments of one leaf invocation, in slot order.
#[derive(Debug)]
pub struct ArgumentSet {
    args: Vec<Value>,
}

impl ArgumentSet {
    pub(crate) fn new(args: Vec<Value>) -> Self {
        Self { args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn value(&self, index: usize) -> CommandResult<&Value> {
        self.args
            .get(index)
            .ok_or_else(|| InternalError::MissingArgument { index }.into())
    }

    pub fn get_ref<T: Any>(&self, index: usize) -> CommandResult<&T> {
        let value = self.value(index)?;
        value.downcast_ref::<T>().ok_or_else(|| {
            InternalError::WrongArgumentType {
                index,
                expected: type_name::<T>(),
                found: value.type_name(),
            }
            .into()
        })
    }

    pub fn get<T: Any + Clone>(&self, index: usize) -> CommandResult<T> {
        self.get_ref::<T>(index).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.args.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;

    #[test]
    fn typed_access() {
        let set = ArgumentSet::new(vec![Value::new(1i32), Value::new("two".to_string())]);
        assert_eq!(set.get::<i32>(0).unwrap(), 1);
        assert_eq!(set.get_ref::<String>(1).unwrap(), "two");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn wrong_type_and_missing_index_are_internal_errors() {
        let set = ArgumentSet::new(vec![Value::new(1i32)]);
        assert!(matches!(
            set.get::<bool>(0),
            Err(CommandError::Internal(InternalError::WrongArgumentType {
                index: 0,
                found: "i32",
                ..
            }))
        ));
        assert!(matches!(
            set.get::<i32>(3),
            Err(CommandError::Internal(InternalError::MissingArgument { index: 3 }))
        ));
    }
}
