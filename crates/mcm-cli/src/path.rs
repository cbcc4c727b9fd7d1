//! Slash-separated addressing into a tag tree: `Data/Player/Pos/0`.
//! Compound children are addressed by name, List elements by index.

use anyhow::{anyhow, bail, Context};
use mcm_nbt::{Compound, List, Value};

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// The value at `path` below `root`.
pub fn lookup<'a>(root: &'a Value, path: &str) -> anyhow::Result<&'a Value> {
    let mut current = root;
    for segment in segments(path) {
        current = match current {
            Value::Compound(c) => c
                .get(segment)
                .map(|t| t.value())
                .ok_or_else(|| anyhow!("no tag named \"{segment}\""))?,
            Value::List(list) => {
                let index = parse_index(segment)?;
                list.get(index)
                    .ok_or_else(|| anyhow!("index {index} out of range for list of {}", list.len()))?
            }
            other => bail!("{} tag has no children (at \"{segment}\")", other.tag_type()),
        };
    }
    Ok(current)
}

/// Replace the number or string at `path` with `raw` parsed as the same
/// type. Returns the previous value.
pub fn assign(root: &mut Value, path: &str, raw: &str) -> anyhow::Result<Value> {
    assign_at(root, &segments(path), raw)
}

fn assign_at(target: &mut Value, segments: &[&str], raw: &str) -> anyhow::Result<Value> {
    let Some((first, rest)) = segments.split_first() else {
        let replacement = parse_like(target, raw)?;
        return Ok(std::mem::replace(target, replacement));
    };
    match target {
        Value::Compound(c) => assign_in_compound(c, first, rest, raw),
        Value::List(list) => assign_in_list(list, first, rest, raw),
        other => bail!("{} tag has no children (at \"{first}\")", other.tag_type()),
    }
}

fn assign_in_compound(c: &mut Compound, name: &str, rest: &[&str], raw: &str) -> anyhow::Result<Value> {
    let mut child = c
        .get_mut(name)
        .ok_or_else(|| anyhow!("no tag named \"{name}\""))?;
    let Some((next, rest)) = rest.split_first() else {
        let replacement = parse_like(&child, raw)?;
        return Ok(child.set(replacement)?);
    };
    let ty = child.tag_type();
    if let Some(inner) = child.as_compound_mut() {
        return assign_in_compound(inner, next, rest, raw);
    }
    if let Some(list) = child.as_list_mut() {
        return assign_in_list(list, next, rest, raw);
    }
    bail!("{ty} tag has no children (at \"{next}\")")
}

/// List elements are edited on a copy and stored back through `List::set`,
/// which re-checks the element type.
fn assign_in_list(list: &mut List, segment: &str, rest: &[&str], raw: &str) -> anyhow::Result<Value> {
    let index = parse_index(segment)?;
    let mut element = list
        .get(index)
        .cloned()
        .ok_or_else(|| anyhow!("index {index} out of range for list of {}", list.len()))?;
    let previous = assign_at(&mut element, rest, raw)?;
    list.set(index, element)?;
    Ok(previous)
}

fn parse_index(segment: &str) -> anyhow::Result<usize> {
    segment
        .parse()
        .with_context(|| format!("\"{segment}\" is not a list index"))
}

/// Parse `raw` as a value of the same type as `current`.
fn parse_like(current: &Value, raw: &str) -> anyhow::Result<Value> {
    let ty = current.tag_type();
    let bad = || format!("\"{raw}\" is not a valid {ty}");
    Ok(match current {
        Value::Byte(_) => Value::Byte(raw.parse().with_context(bad)?),
        Value::Short(_) => Value::Short(raw.parse().with_context(bad)?),
        Value::Int(_) => Value::Int(raw.parse().with_context(bad)?),
        Value::Long(_) => Value::Long(raw.parse().with_context(bad)?),
        Value::Float(_) => Value::Float(raw.parse().with_context(bad)?),
        Value::Double(_) => Value::Double(raw.parse().with_context(bad)?),
        Value::String(_) => Value::String(raw.to_owned()),
        _ => bail!("{ty} tags cannot be set from the command line"),
    })
}

/// JSON rendering of a value. Compound keys are sorted; numbers keep their
/// value but not their width.
pub fn to_json(value: &Value) -> serde_json::Value {
    use serde_json::{json, Map, Value as Json};

    match value {
        Value::End => Json::Null,
        Value::Byte(v) => json!(v),
        Value::Short(v) => json!(v),
        Value::Int(v) => json!(v),
        Value::Long(v) => json!(v),
        Value::Float(v) => json!(v),
        Value::Double(v) => json!(v),
        Value::ByteArray(v) => json!(v.iter().map(|b| *b as i8).collect::<Vec<_>>()),
        Value::String(v) => json!(v),
        Value::IntArray(v) => json!(v),
        Value::List(list) => Json::Array(list.iter().map(to_json).collect()),
        Value::Compound(c) => {
            let mut entries: Vec<_> = c
                .iter()
                .map(|t| (t.name().unwrap_or_default().to_owned(), to_json(t.value())))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Json::Object(entries.into_iter().collect::<Map<_, _>>())
        }
    }
}
