//! Closure queries over the index.
//!
//! Every query is a plain lookup against one or more partitions; a type
//! being a tag and a type having subtypes are answered by checking keys of
//! the annotation and subtype partitions respectively.

use super::{Store, names};
use crate::error::Result;
use crate::member_key;
use classdex_plugin::{INHERITED_TAG, INTERFACE_MARKER};
use regex::Regex;
use std::collections::{HashSet, VecDeque};

impl Store {
    /// All strict descendants of `type_name`, following subtype edges to a
    /// fixpoint. Terminates on cycles; the queried type is never part of the
    /// result.
    pub fn subtypes_of(&self, type_name: &str) -> HashSet<String> {
        let Some(sub_types) = self.find_partition(names::SUB_TYPES) else {
            return HashSet::new();
        };

        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<String> = sub_types.get(type_name).into_iter().collect();

        while let Some(current) = frontier.pop_front() {
            if current == type_name || visited.contains(&current) {
                continue;
            }
            frontier.extend(sub_types.get(&current));
            visited.insert(current);
        }

        visited
    }

    /// Types recorded as having at least one direct subtype
    pub fn super_types(&self) -> HashSet<String> {
        self.keys(names::SUB_TYPES)
    }

    pub fn has_subtypes(&self, type_name: &str) -> bool {
        self.contains_key(names::SUB_TYPES, type_name)
    }

    /// Every tag seen attached to a type
    pub fn tags(&self) -> HashSet<String> {
        let mut tags = self.keys(names::TYPE_ANNOTATIONS);
        tags.remove(INTERFACE_MARKER);
        tags
    }

    pub fn is_tag(&self, name: &str) -> bool {
        name != INTERFACE_MARKER && self.contains_key(names::TYPE_ANNOTATIONS, name)
    }

    /// Whether `type_name` is a tagged interface
    pub fn is_interface(&self, type_name: &str) -> bool {
        self.find_partition(names::TYPE_ANNOTATIONS)
            .is_some_and(|p| p.contains(INTERFACE_MARKER, type_name))
    }

    /// Whether `tag` was declared with the propagation marker
    pub fn is_inherited_tag(&self, tag: &str) -> bool {
        self.find_partition(names::TYPE_ANNOTATIONS)
            .is_some_and(|p| p.contains(INHERITED_TAG, tag))
    }

    /// Types carrying `tag`, choosing the closure rule from the tag itself:
    /// propagating tags follow subtype inheritance only, other tags
    /// propagate through tags-on-tags and subtypes. Unknown tags yield the
    /// empty set.
    pub fn types_tagged_with(&self, tag: &str) -> HashSet<String> {
        if !self.is_tag(tag) {
            return HashSet::new();
        }
        if self.is_inherited_tag(tag) {
            self.types_tagged_with_inherited(tag)
        } else {
            self.all_types_tagged_with(tag)
        }
    }

    /// Types carrying `tag`, with the closure rule chosen by the caller.
    pub fn types_tagged_with_honoring(&self, tag: &str, honor_inherited: bool) -> HashSet<String> {
        if honor_inherited {
            self.types_tagged_with_inherited(tag)
        } else {
            self.all_types_tagged_with(tag)
        }
    }

    /// Blanket propagation: a tag placed on another tag reaches everything
    /// that tag reaches, and a tag placed on a type reaches all its subtypes.
    pub fn all_types_tagged_with(&self, tag: &str) -> HashSet<String> {
        let mut result = HashSet::new();
        let mut seen_tags = HashSet::new();
        let mut pending = vec![tag.to_string()];

        while let Some(current) = pending.pop() {
            if !seen_tags.insert(current.clone()) {
                continue;
            }
            for tagged in self.get(names::TYPE_ANNOTATIONS, &current) {
                if self.is_tag(&tagged) {
                    pending.push(tagged.clone());
                } else if self.has_subtypes(&tagged) {
                    result.extend(self.subtypes_of(&tagged));
                }
                result.insert(tagged);
            }
        }

        result
    }

    /// Inheritance-like propagation: only for tags declared with the
    /// propagation marker. Directly tagged classes are extended with their
    /// subtypes; tagged interfaces and tags placed on tags are reported but
    /// not followed.
    pub fn types_tagged_with_inherited(&self, tag: &str) -> HashSet<String> {
        let mut result = HashSet::new();
        if !self.is_inherited_tag(tag) {
            return result;
        }

        for tagged in self.get(names::TYPE_ANNOTATIONS, tag) {
            if !self.is_tag(&tagged) && !self.is_interface(&tagged) {
                result.extend(self.subtypes_of(&tagged));
            }
            result.insert(tagged);
        }

        result
    }

    /// Keys of methods (and constructors) carrying `tag`
    pub fn methods_tagged_with(&self, tag: &str) -> HashSet<String> {
        self.get(names::METHOD_ANNOTATIONS, tag)
    }

    /// Keys of fields carrying `tag`
    pub fn fields_tagged_with(&self, tag: &str) -> HashSet<String> {
        self.get(names::FIELD_ANNOTATIONS, tag)
    }

    /// Keys of methods converting a `from` value into a `to` value
    pub fn converters(&self, from: &str, to: &str) -> HashSet<String> {
        self.get(names::CONVERTERS, &member_key::converter_key(from, to))
    }

    /// Relative paths of resources whose simple name is `name`
    pub fn resources(&self, name: &str) -> HashSet<String> {
        self.get(names::RESOURCES, name)
    }

    /// Relative paths of resources whose simple name passes `predicate`
    pub fn resources_where(&self, predicate: impl Fn(&str) -> bool) -> HashSet<String> {
        let keys: Vec<String> = self
            .keys(names::RESOURCES)
            .into_iter()
            .filter(|name| predicate(name))
            .collect();
        self.get_many(names::RESOURCES, keys)
    }

    /// Relative paths of resources whose simple name fully matches the
    /// regular expression `pattern`, e.g. `.*\.xml`
    pub fn resources_matching(&self, pattern: &str) -> Result<HashSet<String>> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(self.resources_where(|name| regex.is_match(name)))
    }

    /// Every scanned type name
    pub fn types(&self) -> HashSet<String> {
        self.keys(names::TYPES)
    }

    /// Field names and method keys recorded for `type_name`
    pub fn type_elements(&self, type_name: &str) -> HashSet<String> {
        self.get(names::TYPE_ELEMENTS, type_name)
    }
}
