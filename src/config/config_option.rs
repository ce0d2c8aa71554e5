use crate::generator::AttemptState;

/// A configurable value, together with its bounds and the last state of an attempt at which changes to the value take effect.
#[derive(Clone, Debug)]
pub struct ConfigOption<T> {
    pub name: &'static str,
    pub min: T,
    pub max: T,
    pub max_state: AttemptState,
    pub value: T,
}

impl<T: Clone + PartialOrd> ConfigOption<T> {
    pub fn min_max(&self) -> (T, T) {
        (self.min.clone(), self.max.clone())
    }

    /// Sets the value of the option, if the value is within the bounds of the option.
    ///
    /// Returns whether the value was set.
    pub fn set(&mut self, value: T) -> bool {
        if value < self.min || self.max < value {
            log::warn!("Value for {} outside of bounds, ignored.", self.name);
            return false;
        }
        self.value = value;
        true
    }
}
