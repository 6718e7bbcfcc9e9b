use std::fmt;

use super::EMPTY_SET;

/// A regular expression as a value. Build it through [`Regex::union`],
/// [`Regex::concat`] and [`Regex::star`], which simplify as they go.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Regex {
    /// The empty language.
    Empty,
    Epsilon,
    Symbol(String),
    Union(Vec<Regex>),
    Concat(Vec<Regex>),
    Star(Box<Regex>),
}

impl Regex {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Regex::Symbol(symbol.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Regex::Empty)
    }

    /// `∅` is the identity and repeated members collapse.
    pub fn union(self, other: Regex) -> Regex {
        let mut members: Vec<Regex> = Vec::new();
        for r in [self, other] {
            match r {
                Regex::Empty => {}
                Regex::Union(rs) => members.extend(rs),
                r => members.push(r),
            }
        }
        let mut unique: Vec<Regex> = Vec::with_capacity(members.len());
        for m in members {
            if !unique.contains(&m) {
                unique.push(m);
            }
        }
        match unique.len() {
            0 => Regex::Empty,
            1 => unique.remove(0),
            _ => Regex::Union(unique),
        }
    }

    /// `∅` annihilates and `ε` is the identity.
    pub fn concat(self, other: Regex) -> Regex {
        match (self, other) {
            (Regex::Empty, _) | (_, Regex::Empty) => Regex::Empty,
            (Regex::Epsilon, r) | (r, Regex::Epsilon) => r,
            (Regex::Concat(mut left), Regex::Concat(right)) => {
                left.extend(right);
                Regex::Concat(left)
            }
            (Regex::Concat(mut left), r) => {
                left.push(r);
                Regex::Concat(left)
            }
            (l, Regex::Concat(mut right)) => {
                right.insert(0, l);
                Regex::Concat(right)
            }
            (l, r) => Regex::Concat(vec![l, r]),
        }
    }

    /// `∅*` and `ε*` are `ε`; an `ε` inside a starred union is dropped.
    pub fn star(self) -> Regex {
        match self {
            Regex::Empty | Regex::Epsilon => Regex::Epsilon,
            Regex::Star(inner) => Regex::Star(inner),
            Regex::Union(members) => {
                let inner = members
                    .into_iter()
                    .filter(|m| *m != Regex::Epsilon)
                    .fold(Regex::Empty, Regex::union);
                match inner {
                    Regex::Empty | Regex::Epsilon => Regex::Epsilon,
                    Regex::Star(inner) => Regex::Star(inner),
                    inner => Regex::Star(Box::new(inner)),
                }
            }
            r => Regex::Star(Box::new(r)),
        }
    }

    fn is_single_char(&self) -> bool {
        match self {
            Regex::Symbol(s) => s.chars().count() == 1,
            Regex::Empty | Regex::Epsilon => true,
            _ => false,
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regex::Empty => write!(f, "{}", EMPTY_SET),
            Regex::Epsilon => write!(f, "{}", crate::grammar::EPSILON),
            Regex::Symbol(s) => write!(f, "{}", s),
            Regex::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", m)?;
                }
                Ok(())
            }
            Regex::Concat(parts) => {
                for p in parts {
                    match p {
                        Regex::Union(_) => write!(f, "({})", p)?,
                        p => write!(f, "{}", p)?,
                    }
                }
                Ok(())
            }
            Regex::Star(inner) => {
                if inner.is_single_char() {
                    write!(f, "{}*", inner)
                } else {
                    write!(f, "({})*", inner)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn a() -> Regex {
        Regex::symbol("a")
    }

    fn b() -> Regex {
        Regex::symbol("b")
    }

    #[test]
    fn simplification() {
        assert_eq!(a().union(a()), a());
        assert_eq!(Regex::Empty.union(a()), a());
        assert_eq!(a().concat(Regex::Empty), Regex::Empty);
        assert_eq!(Regex::Epsilon.concat(a()), a());
        assert_eq!(Regex::Empty.star(), Regex::Epsilon);
        assert_eq!(Regex::Epsilon.star(), Regex::Epsilon);
        assert_eq!(Regex::Epsilon.union(a()).star(), a().star());
        assert_eq!(a().star().star(), a().star());
    }

    #[test]
    fn parentheses_only_where_needed() {
        assert_eq!(a().union(b()).to_string(), "a|b");
        assert_eq!(a().concat(a().union(b())).to_string(), "a(a|b)");
        assert_eq!(a().concat(b()).star().to_string(), "(ab)*");
        assert_eq!(a().union(b()).star().to_string(), "(a|b)*");
        assert_eq!(a().star().concat(b()).to_string(), "a*b");
        assert_eq!(Regex::Empty.to_string(), "∅");
        assert_eq!(Regex::Epsilon.union(a()).to_string(), "ε|a");
    }
}
