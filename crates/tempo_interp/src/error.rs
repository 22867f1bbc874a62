//! Interpreter error types.
//!
//! Every structural violation of the supported Verilog subset is detected
//! while the kernel is being constructed, so simulation itself never fails:
//! a module that passes [`InterpKernel::new`](crate::kernel::InterpKernel::new)
//! runs without recoverable errors.

/// Errors raised while constructing an interpreter over a module.
#[derive(Debug, thiserror::Error)]
pub enum InterpError {
    /// A `#delay` control appears in the module; delays are unsynthesizable.
    #[error("delay controls are unsynthesizable and cannot be interpreted")]
    DelayControl,

    /// A blocking or nonblocking assignment carries an intra-assignment
    /// timing control.
    #[error("timing controls on assignments are not supported")]
    TimingControlledAssign,

    /// An event watches something other than a plain identifier.
    #[error("event expressions must be plain identifiers")]
    ComplexEventExpression,

    /// A use-site identifier has no matching declaration.
    #[error("identifier `{name}` does not resolve to a declaration")]
    Unresolved {
        /// The unresolvable name.
        name: String,
    },

    /// Two declarations share one name.
    #[error("identifier `{name}` is declared more than once")]
    DuplicateDecl {
        /// The doubly-declared name.
        name: String,
    },

    /// An identifier use carries more subscripts than its declaration admits.
    #[error("identifier `{name}` used with {dims} subscripts")]
    SubscriptDepth {
        /// The subscripted name.
        name: String,
        /// The number of subscripts at the offending use site.
        dims: usize,
    },
}
