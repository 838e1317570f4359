//! Map domain
//!
//! Lifts a value lattice to persistent maps `K → V`. Branch states share
//! structure, so cloning a map at a fork is O(1).
//!
//! A key missing on one side of a merge keeps the other side's value.

use super::lattice::AbstractDomain;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::marker::PhantomData;

pub type MapData<K, V> = im::OrdMap<K, V>;

#[derive(Debug, Clone, Default)]
pub struct MapDomain<K, D> {
    value_domain: D,
    _key: PhantomData<fn() -> K>,
}

impl<K, D> MapDomain<K, D> {
    pub fn new(value_domain: D) -> Self {
        Self {
            value_domain,
            _key: PhantomData,
        }
    }

    pub fn value_domain(&self) -> &D {
        &self.value_domain
    }
}

impl<K, D> AbstractDomain for MapDomain<K, D>
where
    K: Ord + Clone + Debug,
    D: AbstractDomain,
{
    type Value = MapData<K, D::Value>;

    fn bottom(&self) -> Self::Value {
        MapData::new()
    }

    fn unknown_or_maybe(&self) -> Self::Value {
        MapData::new()
    }

    fn compare(&self, old: &Self::Value, new: &Self::Value, assert_monotonicity: bool) -> Ordering {
        if old.ptr_eq(new) {
            return Ordering::Equal;
        }
        if old.keys().any(|k| !new.contains_key(k)) {
            if assert_monotonicity {
                tracing::warn!(
                    old_len = old.len(),
                    new_len = new.len(),
                    "Non-monotonic map update: keys dropped"
                );
            }
            return Ordering::Greater;
        }

        let mut all_equal = old.len() == new.len();
        for (key, old_value) in old.iter() {
            let Some(new_value) = new.get(key) else {
                continue;
            };
            match self
                .value_domain
                .compare(old_value, new_value, assert_monotonicity)
            {
                Ordering::Greater => return Ordering::Greater,
                Ordering::Less => all_equal = false,
                Ordering::Equal => {}
            }
        }
        if all_equal {
            Ordering::Equal
        } else {
            Ordering::Less
        }
    }

    fn merge(&self, a: &Self::Value, b: &Self::Value) -> Self::Value {
        if a.ptr_eq(b) {
            return a.clone();
        }
        let mut result = a.clone();
        for (key, b_value) in b.iter() {
            let merged = match a.get(key) {
                Some(a_value) => self.value_domain.merge(a_value, b_value),
                None => b_value.clone(),
            };
            result.insert(key.clone(), merged);
        }
        result
    }
}
