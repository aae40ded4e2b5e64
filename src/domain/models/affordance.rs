/// The control a user invokes to deliver the next chunk. Implementations
/// hold a single slot: `show` is only ever called with nothing visible.
pub trait ContinuationAffordance {
    /// Makes the control visible, labelled with the ordinal of the chunk it
    /// will deliver.
    fn show(&mut self, ordinal: usize);

    /// Hides the control. A no-op when nothing is visible.
    fn remove(&mut self);
}

pub type AffordanceBox = Box<dyn ContinuationAffordance + Send>;
