// ---------------------------------
// enum for managing callbacks
// ---------------------------------

#[derive(Default, Debug)]
pub(crate) enum Callback<I> {
    #[default]
    None,
    Rust(fn(&I) -> bool),
}

impl<I> Callback<I> {
    // Call the callback function
    fn call(&self, info: &I) -> bool {
        match self {
            Callback::None => false,
            Callback::Rust(f) => f(info),
        }
    }
}

#[derive(Debug)]
pub(crate) struct SolverCallbacks<I> {
    /// callback for termination
    pub termination_callback: Callback<I>,
}

impl<I> Default for SolverCallbacks<I> {
    // Create a new set of callbacks
    fn default() -> Self {
        Self {
            termination_callback: Callback::None,
        }
    }
}

impl<I> SolverCallbacks<I> {
    pub(crate) fn check_termination(&self, info: &I) -> bool {
        // check termination conditions
        self.termination_callback.call(info)
    }
}

#[test]
fn test_callback_dispatch() {
    let mut callbacks = SolverCallbacks::<u32>::default();
    assert!(!callbacks.check_termination(&7));

    callbacks.termination_callback = Callback::Rust(|i| *i > 5);
    assert!(callbacks.check_termination(&7));
    assert!(!callbacks.check_termination(&3));
}
