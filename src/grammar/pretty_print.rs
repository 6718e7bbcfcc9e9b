use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    chomsky::Classification,
    equivalence::Comparison,
    ll1_parsing_table::{Conflict, Ll1Table},
    Grammar, EPSILON,
};

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

fn tex_symbols(symbols: &[String], separator: &str) -> String {
    symbols
        .iter()
        .map(|s| escape::tex(s.as_str()).to_string())
        .collect::<Vec<_>>()
        .join(separator)
        .replace(EPSILON, r"\epsilon")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput {
    pub left: String,
    pub rights: Vec<Vec<String>>,
}

impl ProductionOutput {
    fn right_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.rights.iter().map(|right| {
            if right.is_empty() {
                EPSILON.to_string()
            } else {
                right.join(" ")
            }
        })
    }

    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.right_strings()
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left.as_str()))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left.as_str()))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                if right.is_empty() {
                    r"\epsilon".to_string()
                } else {
                    tex_symbols(right, " \\ ")
                }
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutputVec {
    productions: Vec<ProductionOutput>,
}

impl ProductionOutputVec {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex(true)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let mut productions: Vec<ProductionOutput> = Vec::new();
        for p in &self.productions {
            let left = p.alpha_string();
            let right: Vec<String> = p.beta.iter().map(|s| s.to_string()).collect();
            match productions.iter_mut().find(|o| o.left == left) {
                Some(output) => output.rights.push(right),
                None => productions.push(ProductionOutput {
                    left,
                    rights: vec![right],
                }),
            }
        }
        ProductionOutputVec { productions }
    }
}

impl Classification {
    pub fn to_plaintext(&self) -> String {
        std::iter::once(self.label.to_string())
            .chain(self.justification.iter().map(|j| format!("  - {}", j)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let title = format!("\\textbf{{{}}}", escape::tex(self.label));
        if self.justification.is_empty() {
            return title;
        }
        let items = self
            .justification
            .iter()
            .map(|j| format!("  \\item {}", escape::tex(j.as_str()).replace(EPSILON, r"$\epsilon$")))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{}\n\\begin{{itemize}}\n{}\n\\end{{itemize}}", title, items)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NonTerminalOutput {
    name: String,
    nullable: bool,
    first: Vec<String>,
    follow: Vec<String>,
}

impl NonTerminalOutput {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        let f = |a: &[String]| {
            a.iter()
                .map(|s| escape::tex(s.as_str()).to_string())
                .collect::<Vec<_>>()
                .join(r"\ ")
                .replace(EPSILON, r"$\epsilon$")
        };

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name.as_str()),
            self.nullable,
            f(&self.first[..]),
            f(&self.follow[..])
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NonTerminalOutputVec {
    data: Vec<NonTerminalOutput>,
}

impl NonTerminalOutputVec {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

fn owned(names: Option<Vec<&str>>) -> Vec<String> {
    names
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

impl Ll1Table {
    /// One row per non-terminal; FIRST keeps ε when the non-terminal is
    /// nullable.
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec {
        let data = self
            .non_terminals()
            .into_iter()
            .map(|name| {
                let first = owned(self.first(name));
                NonTerminalOutput {
                    name: name.to_string(),
                    nullable: first.iter().any(|s| s == EPSILON),
                    first,
                    follow: owned(self.follow(name)),
                }
            })
            .collect();
        NonTerminalOutputVec { data }
    }

    pub fn to_output(&self) -> Ll1TableOutput {
        let terminals: Vec<String> = self.terminals().iter().map(|t| t.to_string()).collect();
        let rows = self
            .non_terminals()
            .into_iter()
            .map(|nt| {
                let cells: Vec<Vec<ProductionOutput>> = terminals
                    .iter()
                    .map(|t| {
                        self.cell(nt, t)
                            .into_iter()
                            .map(|right| ProductionOutput {
                                left: nt.to_string(),
                                rights: vec![right],
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect();
                (nt.to_string(), cells)
            })
            .collect();

        Ll1TableOutput {
            terminals,
            rows,
            conflicts: self.conflicts().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Ll1TableOutput {
    terminals: Vec<String>,
    rows: Vec<(String, Vec<Vec<ProductionOutput>>)>,
    conflicts: Vec<Conflict>,
}

impl Ll1TableOutput {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().cloned());
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.clone()];
            line.extend(row.iter().map(|productions| {
                productions
                    .iter()
                    .map(|production| production.to_plaintext(left.chars().count(), false))
                    .collect::<Vec<_>>()
                    .join(", ")
            }));
            output.push(line);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| {
                output
                    .iter()
                    .map(|line| line[j].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let table = output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| {
                        let pad = width[i].saturating_sub(s.chars().count());
                        format!("{}{}", " ".repeat(pad), s)
                    })
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n");

        if self.conflicts.is_empty() {
            return table;
        }
        let conflicts = self
            .conflicts
            .iter()
            .map(|c| {
                format!(
                    "conflict at ({}, {}): {}",
                    c.non_terminal,
                    c.terminal,
                    c.alternatives
                        .iter()
                        .map(|alt| if alt.is_empty() {
                            EPSILON.to_string()
                        } else {
                            alt.join(" ")
                        })
                        .collect::<Vec<_>>()
                        .join(" / ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("{}\n\n{}", table, conflicts)
    }

    pub fn to_latex(&self) -> String {
        let header = format!(
            "\\begin{{tabular}}{{c{}}}\n & {} \\\\\\hline",
            "|l".repeat(self.terminals.len()),
            self.terminals
                .iter()
                .map(|t| format!("\\text{{{}}}", escape::tex(t.as_str())))
                .collect::<Vec<_>>()
                .join(" & ")
        );

        let content = self
            .rows
            .iter()
            .map(|(left, row)| {
                std::iter::once(escape::tex(left.as_str()).to_string())
                    .chain(row.iter().map(|productions| {
                        let cell = productions
                            .iter()
                            .map(|p| format!("${}$", p.to_latex(false)))
                            .collect::<Vec<_>>()
                            .join("; ");
                        if productions.len() > 1 {
                            format!("{{\\color{{red}}{}}}", cell)
                        } else {
                            cell
                        }
                    }))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join(" \\\\\n");

        format!("{}\n{}\n\\end{{tabular}}", header, content)
    }
}

impl Comparison {
    pub fn to_plaintext(&self) -> String {
        self.message()
    }

    pub fn to_latex(&self) -> String {
        let list = |strings: &[String]| {
            strings
                .iter()
                .map(|s| {
                    if s.is_empty() {
                        r"$\epsilon$".to_string()
                    } else {
                        format!("\\texttt{{{}}}", escape::tex(s.as_str()))
                    }
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        if self.equivalent {
            format!(
                "Possibly equivalent: both grammars generate the same {} strings of length at most {}.",
                self.left_count, self.max_len
            )
        } else {
            format!(
                "Not equivalent ($n = {}$).\\\\\nOnly in grammar 1: {}\\\\\nOnly in grammar 2: {}",
                self.max_len,
                list(&self.only_in_left[..]),
                list(&self.only_in_right[..])
            )
        }
    }
}
