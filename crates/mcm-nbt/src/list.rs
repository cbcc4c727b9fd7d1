use crate::error::{NbtError, NbtResult, TypeMismatchError};
use crate::tag::{Tag, Value};
use crate::types::TagType;

/// A homogeneous, ordered sequence of unnamed values.
///
/// The element type is fixed at construction. A list created with
/// [`List::empty`] has element type `End` and adopts the type of the first
/// element added to it; once it holds an element the type never changes
/// again, even if every element is later removed.
#[derive(Clone, Debug, PartialEq)]
pub struct List {
    element_type: TagType,
    items: Vec<Value>,
}

impl Default for List {
    fn default() -> Self {
        Self::empty()
    }
}

impl List {
    /// An empty list locked to `element_type`.
    pub fn new(element_type: TagType) -> Self {
        Self {
            element_type,
            items: Vec::new(),
        }
    }

    /// An empty, untyped (`End`) list.
    pub fn empty() -> Self {
        Self::new(TagType::End)
    }

    /// Build a list of `element_type` from `tags`, checking every element.
    pub fn from_tags<T, I>(element_type: TagType, tags: I) -> NbtResult<Self>
    where
        T: Into<Tag>,
        I: IntoIterator<Item = T>,
    {
        let mut list = Self::new(element_type);
        list.append(tags)?;
        Ok(list)
    }

    /// Element type of this list.
    pub fn supports(&self) -> TagType {
        self.element_type
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Replace the element at `index`.
    pub fn set(&mut self, index: usize, tag: impl Into<Tag>) -> NbtResult<Value> {
        let len = self.items.len();
        if index >= len {
            return Err(NbtError::IndexOutOfBounds { index, len });
        }
        let value = check_element(self.element_type, tag.into())?;
        Ok(std::mem::replace(&mut self.items[index], value))
    }

    /// Insert `tags` before `index`, preserving their order.
    ///
    /// Either every tag is inserted or, on the first violation, none is.
    pub fn insert<T, I>(&mut self, index: usize, tags: I) -> NbtResult<()>
    where
        T: Into<Tag>,
        I: IntoIterator<Item = T>,
    {
        let len = self.items.len();
        if index > len {
            return Err(NbtError::IndexOutOfBounds { index, len });
        }
        let (element_type, values) = self.admit(tags)?;
        self.element_type = element_type;
        self.items.splice(index..index, values);
        Ok(())
    }

    /// Append `tags` at the end, all or nothing.
    pub fn append<T, I>(&mut self, tags: I) -> NbtResult<()>
    where
        T: Into<Tag>,
        I: IntoIterator<Item = T>,
    {
        let (element_type, values) = self.admit(tags)?;
        self.element_type = element_type;
        self.items.extend(values);
        Ok(())
    }

    /// Append a single value.
    pub fn push(&mut self, value: impl Into<Value>) -> NbtResult<()> {
        self.append([value.into()])
    }

    /// Append every element of `other`, which must hold the same element type.
    pub fn extend_from(&mut self, other: &List) -> NbtResult<()> {
        if other.is_empty() {
            return Ok(());
        }
        self.append(other.items.iter().cloned())
    }

    /// Remove and return the element at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Value> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn into_values(self) -> Vec<Value> {
        self.items
    }

    /// Check a batch of tags against this list without modifying it, returning
    /// the element type the list will have afterwards and the values to store.
    fn admit<T, I>(&self, tags: I) -> Result<(TagType, Vec<Value>), TypeMismatchError>
    where
        T: Into<Tag>,
        I: IntoIterator<Item = T>,
    {
        let mut element_type = self.element_type;
        let mut values = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if element_type == TagType::End && self.items.is_empty() && values.is_empty() {
                if tag.is_end() {
                    return Err(TypeMismatchError::EndElement);
                }
                element_type = tag.tag_type();
            }
            values.push(check_element(element_type, tag)?);
        }
        Ok((element_type, values))
    }

    /// Used by the decoder, which has already checked every element's type.
    pub(crate) fn from_checked(element_type: TagType, items: Vec<Value>) -> Self {
        Self {
            element_type,
            items,
        }
    }
}

fn check_element(required: TagType, tag: Tag) -> Result<Value, TypeMismatchError> {
    if tag.is_end() {
        return Err(TypeMismatchError::EndElement);
    }
    let (name, value) = tag.into_parts();
    if let Some(name) = name {
        return Err(TypeMismatchError::NamedElement(name));
    }
    let given = value.tag_type();
    if given != required {
        return Err(TypeMismatchError::WrongType { required, given });
    }
    Ok(value)
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i32]) -> List {
        List::from_tags(TagType::Int, values.iter().map(|v| Value::Int(*v))).unwrap()
    }

    #[test]
    fn append_and_get() {
        let list = ints(&[1, 2, 3]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.supports(), TagType::Int);
        assert_eq!(list.get(1), Some(&Value::Int(2)));
        assert_eq!(list.get(3), None);
    }

    #[test]
    fn wrong_type_leaves_list_unmodified() {
        let mut list = ints(&[1, 2]);
        let before = list.clone();
        let err = list
            .append([Value::Int(3), Value::Byte(4)])
            .unwrap_err();
        assert!(matches!(
            err,
            NbtError::TypeMismatch(TypeMismatchError::WrongType {
                required: TagType::Int,
                given: TagType::Byte,
            })
        ));
        assert_eq!(list, before);
    }

    #[test]
    fn named_element_rejected() {
        let mut list = List::new(TagType::Int);
        let err = list.append([Tag::named("x", 1i32)]).unwrap_err();
        assert!(matches!(
            err,
            NbtError::TypeMismatch(TypeMismatchError::NamedElement(ref n)) if n == "x"
        ));
        assert!(list.is_empty());
    }

    #[test]
    fn end_element_rejected() {
        let mut list = List::empty();
        let err = list.append([Tag::END]).unwrap_err();
        assert!(matches!(
            err,
            NbtError::TypeMismatch(TypeMismatchError::EndElement)
        ));
        assert_eq!(list.supports(), TagType::End);
    }

    #[test]
    fn empty_list_infers_type_on_first_insert() {
        let mut list = List::empty();
        assert_eq!(list.supports(), TagType::End);
        list.push("a").unwrap();
        assert_eq!(list.supports(), TagType::String);
        assert!(list.push(1i32).is_err());
    }

    #[test]
    fn failed_inference_keeps_end_type() {
        let mut list = List::empty();
        assert!(list.append([Value::Int(1), Value::Long(2)]).is_err());
        assert_eq!(list.supports(), TagType::End);
        assert!(list.is_empty());
    }

    #[test]
    fn type_stays_locked_after_removal() {
        let mut list = ints(&[1]);
        assert_eq!(list.remove(0), Some(Value::Int(1)));
        assert!(list.is_empty());
        assert_eq!(list.supports(), TagType::Int);
        assert!(list.push(1i8).is_err());
    }

    #[test]
    fn set_replaces_and_checks() {
        let mut list = ints(&[1, 2]);
        assert_eq!(list.set(0, Value::Int(10)).unwrap(), Value::Int(1));
        assert_eq!(list.get(0), Some(&Value::Int(10)));
        assert!(list.set(1, Value::Short(1)).is_err());
        assert!(matches!(
            list.set(5, Value::Int(1)),
            Err(NbtError::IndexOutOfBounds { index: 5, len: 2 })
        ));
    }

    #[test]
    fn insert_preserves_order() {
        let mut list = ints(&[1, 4]);
        list.insert(1, [Value::Int(2), Value::Int(3)]).unwrap();
        let collected: Vec<i32> = list.iter().filter_map(Value::as_int).collect();
        assert_eq!(collected, vec![1, 2, 3, 4]);
        assert!(list.insert(9, [Value::Int(0)]).is_err());
    }

    #[test]
    fn iteration_is_restartable() {
        let list = ints(&[5, 6]);
        let first: Vec<_> = list.iter().collect();
        let second: Vec<_> = (&list).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn extend_from_requires_same_type() {
        let mut a = ints(&[1]);
        a.extend_from(&ints(&[2, 3])).unwrap();
        assert_eq!(a.len(), 3);

        let shorts = List::from_tags(TagType::Short, [Value::Short(1)]).unwrap();
        assert!(a.extend_from(&shorts).is_err());
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn clone_is_independent() {
        let original = ints(&[1, 2]);
        let mut copy = original.clone();
        copy.push(3).unwrap();
        assert_eq!(original.len(), 2);
        assert_eq!(copy.len(), 3);
    }
}
