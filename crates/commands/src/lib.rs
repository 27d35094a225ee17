#![deny(rust_2018_idioms)]

//! A runtime command tree with typed arguments, overload resolution and
//! tab-completion.
//!
//! ```
//! use oneconfig_commands::{builder::*, ParserRegistry, Value};
//!
//! let parsers = ParserRegistry::with_defaults();
//! let tree = CommandBuilder::command(&parsers, "calc")
//!     .then(runs("add").with([int_arg(), int_arg()]).does(|args| {
//!         Ok(Some(Value::new(args.get::<i32>(0)? + args.get::<i32>(1)?)))
//!     }))
//!     .unwrap()
//!     .build();
//!
//! let sum = tree.execute(&["add", "1", "2"]).unwrap().unwrap();
//! assert_eq!(sum.downcast::<i32>().unwrap(), 3);
//! ```

pub mod argument_parser;
mod argument_set;
mod arguments;
mod autocomplete;
pub mod builder;
mod error;
mod executor;
pub mod factory;
mod node;
mod parser_registry;
mod registry;
mod tree;
mod usage;
mod value;

pub use argument_set::ArgumentSet;
pub use arguments::{Arguments, OutOfTokens};
pub use error::{CommandError, CommandResult, DispatchError, InternalError, RegistrationError};
pub use node::{BoundSlot, CommandNode, Executor, Leaf};
pub use parser_registry::{ParserRegistry, SharedParser};
pub use registry::CommandRegistry;
pub use tree::CommandTree;
pub use value::Value;
