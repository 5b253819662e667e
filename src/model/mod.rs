//! Type model: handles, descriptors, and the descriptor source.
//!
//! Everything the validation engine knows about a type comes through this
//! module. [`TypeHandle`] is the opaque identity, [`TypeDescriptor`] and
//! [`FieldDescriptor`] are read-only metadata snapshots, and
//! [`DescriptorSource`] is the injection seam between the engine and whatever
//! produces those snapshots. [`TypeUniverse`] is the built-in, thread-safe
//! source that embedders populate directly.
//!
//! # Examples
//!
//! ```rust
//! use immutascope::model::{FieldModifiers, TypeFlavor, TypeUniverse};
//!
//! let universe = TypeUniverse::new();
//! let i32_ty = universe.get_by_fullname("core.I32").unwrap().handle;
//!
//! let point = universe
//!     .build_type()
//!     .namespace("demo")
//!     .name("Point")
//!     .flavor(TypeFlavor::Class)
//!     .insert()?;
//! universe.add_field(point, "x", i32_ty, FieldModifiers::FINAL)?;
//! # Ok::<(), immutascope::Error>(())
//! ```

mod descriptor;
mod handle;
mod universe;

pub use descriptor::{FieldDescriptor, FieldModifiers, GenericArg, TypeDescriptor, TypeFlavor};
pub use handle::TypeHandle;
pub use universe::{DescriptorSource, TypeBuilder, TypeUniverse};
