//! Deterministic automaton for wildcard token sequences.
//!
//! A wildcard pattern is first tokenized into literals, single-character
//! wildcards and any-sequence wildcards. The token list is read as a
//! position NFA (state `i` means "the first `i` tokens are consumed") which
//! is determinized with the subset construction.
//!
//! The alphabet is derived from the pattern: every distinct literal gets its
//! own symbol id, and every other character of the full Unicode range is
//! lumped into the "other" symbol with id `0`.

use std::collections::{BTreeSet, HashMap, VecDeque};

/// One element of a tokenized wildcard pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    /// Exactly this character.
    Literal(char),
    /// Any single character (`?`).
    AnyChar,
    /// Any sequence of characters, including the empty one (`*`).
    AnyString,
}

/// Symbol id used for characters that do not occur as a literal.
const OTHER_SYMBOL: usize = 0;

/// Deterministic automaton over the characters of a pattern's alphabet.
#[derive(Debug, Clone)]
pub(crate) struct Dfa {
    /// The starting state.
    start_state: usize,

    /// Bitmap of accepting states.
    is_accepting: Vec<bool>,

    /// Transition table: `transitions[state][symbol_id] -> Option<next_state>`.
    /// `None` is the dead state.
    transitions: Vec<Vec<Option<usize>>>,

    /// Literal characters to their symbol id; anything missing maps to `0`.
    char_to_symbol: HashMap<char, usize>,
}

impl Dfa {
    /// Builds the automaton accepting exactly the strings described by `tokens`.
    pub(crate) fn from_tokens(tokens: &[Token]) -> Self {
        let mut char_to_symbol = HashMap::new();
        for token in tokens {
            if let Token::Literal(c) = token {
                let next_id = char_to_symbol.len() + 1;
                char_to_symbol.entry(*c).or_insert(next_id);
            }
        }
        let num_symbols = char_to_symbol.len() + 1;

        let accept_position = tokens.len();
        let start_set = closure(tokens, BTreeSet::from([0]));

        let mut state_ids: HashMap<BTreeSet<usize>, usize> = HashMap::new();
        let mut sets: Vec<BTreeSet<usize>> = Vec::new();
        let mut queue = VecDeque::new();

        state_ids.insert(start_set.clone(), 0);
        sets.push(start_set.clone());
        queue.push_back(start_set);

        let mut transitions: Vec<Vec<Option<usize>>> = vec![vec![None; num_symbols]];

        while let Some(current) = queue.pop_front() {
            let current_id = state_ids[&current];
            for symbol in 0..num_symbols {
                let mut moved = BTreeSet::new();
                for &position in &current {
                    if position >= tokens.len() {
                        continue;
                    }
                    match tokens[position] {
                        Token::Literal(c) => {
                            if char_to_symbol.get(&c) == Some(&symbol) {
                                moved.insert(position + 1);
                            }
                        }
                        Token::AnyChar => {
                            moved.insert(position + 1);
                        }
                        Token::AnyString => {
                            moved.insert(position);
                        }
                    }
                }
                if moved.is_empty() {
                    continue;
                }
                let target = closure(tokens, moved);
                let target_id = match state_ids.get(&target) {
                    Some(id) => *id,
                    None => {
                        let id = sets.len();
                        state_ids.insert(target.clone(), id);
                        sets.push(target.clone());
                        transitions.push(vec![None; num_symbols]);
                        queue.push_back(target);
                        id
                    }
                };
                transitions[current_id][symbol] = Some(target_id);
            }
        }

        let is_accepting = sets.iter().map(|set| set.contains(&accept_position)).collect();

        Self {
            start_state: 0,
            is_accepting,
            transitions,
            char_to_symbol,
        }
    }

    pub(crate) fn start_state(&self) -> usize {
        self.start_state
    }

    pub(crate) fn is_accepting_state(&self, state: usize) -> bool {
        self.is_accepting[state]
    }

    /// Number of states, the dead state not included.
    #[cfg(test)]
    pub(crate) fn num_states(&self) -> usize {
        self.transitions.len()
    }

    fn symbol_id(&self, c: char) -> usize {
        self.char_to_symbol.get(&c).copied().unwrap_or(OTHER_SYMBOL)
    }

    /// Follows one character; `None` is the dead state.
    pub(crate) fn step(&self, state: usize, c: char) -> Option<usize> {
        self.transitions[state][self.symbol_id(c)]
    }

    /// Returns true if the whole of `chars` is accepted.
    pub(crate) fn accepts(&self, chars: &[char]) -> bool {
        let mut state = self.start_state;
        for &c in chars {
            match self.step(state, c) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_accepting_state(state)
    }

    /// The shortest accepted span starting at `begin`, as its end offset.
    pub(crate) fn shortest_end_from(&self, chars: &[char], begin: usize) -> Option<usize> {
        let mut state = self.start_state;
        if self.is_accepting_state(state) {
            return Some(begin);
        }
        for (offset, &c) in chars[begin..].iter().enumerate() {
            state = self.step(state, c)?;
            if self.is_accepting_state(state) {
                return Some(begin + offset + 1);
            }
        }
        None
    }
}

/// Epsilon closure: an any-sequence token may be skipped.
fn closure(tokens: &[Token], mut set: BTreeSet<usize>) -> BTreeSet<usize> {
    let mut pending: Vec<usize> = set.iter().copied().collect();
    while let Some(position) = pending.pop() {
        if position < tokens.len() && tokens[position] == Token::AnyString && set.insert(position + 1) {
            pending.push(position + 1);
        }
    }
    set
}
