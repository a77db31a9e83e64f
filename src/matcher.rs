use crate::model::Value;
use crate::pattern::{Leaf, LeafKind, Pattern};

/// Match a pattern tree against the not-yet-consumed argv leaves.
///
/// Returns the remaining leaves and the accumulated matches on success, and
/// `None` on failure; the caller's `left`/`collected` are never disturbed
/// either way, which is what makes the backtracking in `Required` and
/// `Either` sound.
pub(crate) fn match_pattern(
    pattern: &Pattern,
    left: &[Leaf],
    collected: &[Leaf],
) -> Option<(Vec<Leaf>, Vec<Leaf>)> {
    match pattern {
        Pattern::Required(children) => {
            let mut state = (left.to_vec(), collected.to_vec());
            for child in children {
                state = match_pattern(child, &state.0, &state.1)?;
            }
            Some(state)
        }
        Pattern::Optional(children) | Pattern::OptionsShortcut(children) => {
            let mut state = (left.to_vec(), collected.to_vec());
            for child in children {
                if let Some(next) = match_pattern(child, &state.0, &state.1) {
                    state = next;
                }
            }
            Some(state)
        }
        Pattern::OneOrMore(child) => {
            let mut state = (left.to_vec(), collected.to_vec());
            let mut times = 0;
            loop {
                match match_pattern(child, &state.0, &state.1) {
                    Some(next) => {
                        times += 1;
                        // A match that consumed nothing would loop forever.
                        let consumed = next.0.len() < state.0.len();
                        state = next;
                        if !consumed {
                            break;
                        }
                    }
                    None => break,
                }
            }
            if times >= 1 {
                Some(state)
            } else {
                None
            }
        }
        Pattern::Either(children) => {
            let mut best: Option<(Vec<Leaf>, Vec<Leaf>)> = None;
            for child in children {
                if let Some(outcome) = match_pattern(child, left, collected) {
                    // Prefer the alternative that consumes the most; first
                    // in order wins ties.
                    let better = match &best {
                        None => true,
                        Some((remaining, _)) => outcome.0.len() < remaining.len(),
                    };
                    if better {
                        best = Some(outcome);
                    }
                }
            }
            best
        }
        Pattern::Leaf(leaf) => match_leaf(leaf, left, collected),
    }
}

fn match_leaf(leaf: &Leaf, left: &[Leaf], collected: &[Leaf]) -> Option<(Vec<Leaf>, Vec<Leaf>)> {
    let (position, mut matched) = single_match(leaf, left)?;

    let mut remaining = left.to_vec();
    remaining.remove(position);
    let mut collected = collected.to_vec();

    match &leaf.value {
        // The fix pass declared this leaf repeatable: accumulate into an
        // existing entry of the same name instead of appending twins.
        Value::Count(_) | Value::List(_) => {
            let addition = increment(leaf, &matched);
            match collected
                .iter()
                .position(|entry| entry.name() == leaf.name())
            {
                None => {
                    matched.value = addition;
                    collected.push(matched);
                }
                Some(index) => {
                    let entry = &mut collected[index];
                    entry.value = match std::mem::replace(&mut entry.value, Value::Absent) {
                        Value::Count(count) => Value::Count(count + 1),
                        Value::List(mut items) => {
                            items.extend(addition.as_list().iter().cloned());
                            Value::List(items)
                        }
                        other => other,
                    };
                }
            }
        }
        _ => collected.push(matched),
    }

    Some((remaining, collected))
}

fn increment(leaf: &Leaf, matched: &Leaf) -> Value {
    match &leaf.value {
        Value::Count(_) => Value::Count(1),
        _ => match &matched.value {
            Value::Text(text) => Value::List(vec![text.clone()]),
            Value::List(items) => Value::List(items.clone()),
            _ => Value::List(Vec::default()),
        },
    }
}

/// Find the first leaf in `left` this pattern leaf consumes.
fn single_match(leaf: &Leaf, left: &[Leaf]) -> Option<(usize, Leaf)> {
    match &leaf.kind {
        LeafKind::Argument { name } => {
            for (position, candidate) in left.iter().enumerate() {
                if candidate.is_argument() {
                    return Some((
                        position,
                        Leaf::argument(name.clone(), candidate.value.clone()),
                    ));
                }
            }
            None
        }
        LeafKind::Command { name } => {
            for (position, candidate) in left.iter().enumerate() {
                if candidate.is_argument() {
                    if candidate.value.as_text() == Some(name.as_str()) {
                        return Some((position, Leaf::command(name.clone(), Value::Flag(true))));
                    }
                    // A command word only ever binds the first positional.
                    return None;
                }
            }
            None
        }
        LeafKind::Option { .. } => left
            .iter()
            .position(|candidate| candidate.name() == leaf.name())
            .map(|position| (position, left[position].clone())),
    }
}
