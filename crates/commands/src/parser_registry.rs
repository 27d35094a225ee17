use crate::{
    argument_parser::{
        ArgumentParser, BooleanParser, DoubleParser, DynArgumentParser, FloatParser,
        IntegerParser, LongParser, ShortParser, StringParser,
    },
    error::RegistrationError,
};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, warn};

pub type SharedParser = Arc<dyn DynArgumentParser>;

/// Maps a target type to the parser that produces it.
///
/// Lookup is by exact type. Leaves bind their parsers when they are built, so
/// replacing a parser later only affects leaves built afterwards.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: FxHashMap<TypeId, SharedParser>,
    names: FxHashMap<&'static str, TypeId>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(IntegerParser);
        registry.register(ShortParser);
        registry.register(LongParser);
        registry.register(FloatParser);
        registry.register(DoubleParser);
        registry.register(BooleanParser);
        registry.register(StringParser);
        registry
    }

    pub fn register<P: ArgumentParser>(&mut self, parser: P) {
        self.register_shared(Arc::new(parser));
    }

    pub fn register_shared(&mut self, parser: SharedParser) {
        let target = parser.target();
        let name = parser.display_name();
        if let Some(previous) = self.parsers.get(&target) {
            warn!(
                "Replacing parser '{}' for {} with '{}'",
                previous.display_name(),
                parser.target_name(),
                name
            );
            self.names.remove(previous.display_name());
        } else {
            debug!("Registered parser '{}' for {}", name, parser.target_name());
        }
        self.names.insert(name, target);
        self.parsers.insert(target, parser);
    }

    pub fn resolve<T: Any>(&self) -> Result<SharedParser, RegistrationError> {
        self.resolve_type(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    pub fn resolve_type(
        &self,
        target: TypeId,
        type_name: &str,
    ) -> Result<SharedParser, RegistrationError> {
        self.parsers
            .get(&target)
            .cloned()
            .ok_or_else(|| RegistrationError::NoParserFound {
                type_name: type_name.to_string(),
            })
    }

    /// Looks a parser up by its display name, e.g. `"int"`.
    pub fn resolve_named(&self, name: &str) -> Result<SharedParser, RegistrationError> {
        self.names
            .get(name)
            .and_then(|target| self.parsers.get(target))
            .cloned()
            .ok_or_else(|| RegistrationError::NoParserFound {
                type_name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument_parser::{ChoiceParser, ParseResult};
    use crate::arguments::Arguments;

    #[test]
    fn defaults_resolve_by_type_and_name() {
        let registry = ParserRegistry::with_defaults();
        assert_eq!(registry.resolve::<i32>().unwrap().display_name(), "int");
        assert_eq!(registry.resolve::<bool>().unwrap().display_name(), "boolean");
        assert_eq!(registry.resolve_named("short").unwrap().target(), TypeId::of::<i16>());
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn unknown_type_is_reported() {
        let registry = ParserRegistry::new();
        assert!(matches!(
            registry.resolve::<u8>(),
            Err(RegistrationError::NoParserFound { type_name }) if type_name == "u8"
        ));
        assert!(registry.resolve_named("int").is_err());
    }

    struct LoudParser;

    impl ArgumentParser for LoudParser {
        type Output = String;

        fn name(&self) -> &'static str {
            "loud"
        }

        fn parse(&self, args: &mut Arguments<'_>) -> ParseResult<String> {
            Ok(args.poll()?.to_uppercase())
        }
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = ParserRegistry::with_defaults();
        let before = registry.resolve::<String>().unwrap();
        registry.register(LoudParser);
        let after = registry.resolve::<String>().unwrap();

        assert_eq!(before.display_name(), "string");
        assert_eq!(after.display_name(), "loud");
        assert!(registry.resolve_named("string").is_err());
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn custom_types_register_alongside_defaults() {
        #[derive(Clone)]
        struct Color(u8);

        let mut registry = ParserRegistry::with_defaults();
        registry.register(ChoiceParser::fixed("color", [("red", Color(0)), ("blue", Color(1))]));
        let parser = registry.resolve::<Color>().unwrap();
        let tokens = vec!["blue".to_string()];
        let value = parser.parse_value(&mut Arguments::new(&tokens)).unwrap();
        assert_eq!(value.downcast_ref::<Color>().map(|c| c.0), Some(1));
    }
}
