/// RAII guard around `IsmPartition::begin_update_raw`/`end_update_raw`

use std::ops::{Deref, DerefMut};
use super::partition::IsmPartition;

/// Open update scope on a partition.
///
/// Derefs to the partition so mutations go through the guard. The scope
/// closes when the guard drops, on every exit path.
pub struct UpdateScope<'a> {
    partition: &'a mut IsmPartition,
}

impl<'a> UpdateScope<'a> {
    pub(crate) fn new(partition: &'a mut IsmPartition) -> Self {
        partition.begin_update_raw();
        Self { partition }
    }
}

impl Deref for UpdateScope<'_> {
    type Target = IsmPartition;

    fn deref(&self) -> &IsmPartition {
        self.partition
    }
}

impl DerefMut for UpdateScope<'_> {
    fn deref_mut(&mut self) -> &mut IsmPartition {
        self.partition
    }
}

impl Drop for UpdateScope<'_> {
    fn drop(&mut self) {
        self.partition.end_update_raw();
    }
}
