use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng;

use chomsky_toolkit::{
    automata::{compile, interchange::samples, Dfa, Nfa, TransitionTable},
    grammar::{
        equivalence::DEFAULT_MAX_LEN,
        examples::{self, Tutor},
        meta::parse_grammar_text,
        pretty_print::to_json, ChomskyType, ConflictPolicy, Ll1Parser, Token,
    },
    Grammar, Ll1Table,
};

#[derive(Parser)]
#[command(name = "chomsky-toolkit")]
#[command(about = "Classify grammars and convert between regular expressions, automata and grammars")]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Plain,
    Latex,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Policy {
    First,
    Ordered,
}

impl From<Policy> for ConflictPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::First => ConflictPolicy::FirstAlternative,
            Policy::Ordered => ConflictPolicy::Ordered,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Chomsky type of a grammar, with the rules that rule out stricter types
    Classify { file: Option<PathBuf> },
    /// Productions grouped by left side
    Productions { file: Option<PathBuf> },
    /// Nullable, FIRST and FOLLOW of every non-terminal
    FirstFollow { file: Option<PathBuf> },
    /// LL(1) parsing table and its conflicts
    Ll1 { file: Option<PathBuf> },
    /// Parse whitespace-separated terminals with a grammar's LL(1) table
    Parse {
        file: PathBuf,
        input: String,
        #[arg(long, value_enum, default_value_t = Policy::Ordered)]
        policy: Policy,
    },
    /// Parse tree of grammar text under the grammar-description language
    ParseText { file: Option<PathBuf> },
    /// Compile a regular expression to a DFA
    Regex {
        expr: String,
        /// Print the equivalent regular grammar instead
        #[arg(long)]
        grammar: bool,
        /// Print Graphviz source instead
        #[arg(long)]
        dot: bool,
    },
    /// DFA of a regular grammar
    GrammarToDfa {
        file: Option<PathBuf>,
        #[arg(long)]
        dot: bool,
    },
    /// Regular grammar of a DFA given as a JSON transition table
    DfaToGrammar { json: PathBuf },
    /// Regular expression of a DFA given as a JSON transition table
    DfaToRegex { json: PathBuf },
    /// Bounded-length language comparison of two grammars
    Compare {
        left: PathBuf,
        right: PathBuf,
        #[arg(short, default_value_t = DEFAULT_MAX_LEN)]
        n: usize,
    },
    /// Example grammar of the given Chomsky type
    Example { grammar_type: u8 },
    /// Sample automata as transition tables
    Samples,
    /// Guess the Chomsky type of a generated grammar
    Tutor {
        /// Answer given up front instead of read from stdin
        #[arg(long)]
        answer: Option<u8>,
    },
}

fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut input = String::new();
            io::stdin().lock().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn read_grammar(file: Option<&Path>) -> Result<Grammar, Box<dyn std::error::Error>> {
    Ok(Grammar::parse(&read_input(file)?)?)
}

fn read_table(file: &Path) -> Result<TransitionTable, Box<dyn std::error::Error>> {
    Ok(TransitionTable::from_json(&fs::read_to_string(file)?)?)
}

fn print_table(table: &TransitionTable, format: OutputFormat, dot: bool) {
    if dot {
        println!("{}", table.to_dot());
        return;
    }
    println!(
        "{}",
        match format {
            OutputFormat::Plain => table.to_plaintext(),
            OutputFormat::Latex => table.to_latex(),
            OutputFormat::Json => table.to_json(),
        }
    );
}

fn print_grammar(g: &Grammar, format: OutputFormat) {
    let t = g.to_production_output_vec();
    println!(
        "{}",
        match format {
            OutputFormat::Plain => t.to_plaintext(),
            OutputFormat::Latex => t.to_latex(),
            OutputFormat::Json => to_json(&t),
        }
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let format = cli.format;

    match cli.command {
        Commands::Classify { file } => {
            let c = read_grammar(file.as_deref())?.classify();
            println!(
                "{}",
                match format {
                    OutputFormat::Plain => c.to_plaintext(),
                    OutputFormat::Latex => c.to_latex(),
                    OutputFormat::Json => to_json(&c),
                }
            );
        }
        Commands::Productions { file } => {
            print_grammar(&read_grammar(file.as_deref())?, format);
        }
        Commands::FirstFollow { file } => {
            let t = Ll1Table::from_grammar(&read_grammar(file.as_deref())?)?;
            let rows = t.to_non_terminal_output_vec();
            println!(
                "{}",
                match format {
                    OutputFormat::Plain => rows.to_plaintext(),
                    OutputFormat::Latex => rows.to_latex(),
                    OutputFormat::Json => rows.to_json(),
                }
            );
        }
        Commands::Ll1 { file } => {
            let t = Ll1Table::from_grammar(&read_grammar(file.as_deref())?)?.to_output();
            println!(
                "{}",
                match format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => to_json(&t),
                }
            );
        }
        Commands::Parse {
            file,
            input,
            policy,
        } => {
            let t = Ll1Table::from_grammar(&read_grammar(Some(file.as_path()))?)?;
            let tree = Ll1Parser::new(&t)
                .with_policy(policy.into())
                .parse(&Token::words(&input))?;
            match format {
                OutputFormat::Json => println!("{}", to_json(&tree)),
                _ => println!("{}", tree.to_plaintext()),
            }
        }
        Commands::ParseText { file } => {
            let (_, tree) = parse_grammar_text(&read_input(file.as_deref())?)?;
            match format {
                OutputFormat::Json => println!("{}", to_json(&tree)),
                _ => println!("{}", tree.to_plaintext()),
            }
        }
        Commands::Regex { expr, grammar, dot } => {
            let dfa = compile(&expr)?.to_dfa();
            if grammar {
                print_grammar(&dfa.to_regular_grammar(), format);
            } else {
                print_table(&dfa.to_table(&expr), format, dot);
            }
        }
        Commands::GrammarToDfa { file, dot } => {
            let nfa = Nfa::from_regular_grammar(&read_grammar(file.as_deref())?)?;
            print_table(&nfa.to_dfa().to_table("grammar DFA"), format, dot);
        }
        Commands::DfaToGrammar { json } => {
            let dfa = Dfa::from_table(&read_table(&json)?)?;
            print_grammar(&dfa.to_regular_grammar(), format);
        }
        Commands::DfaToRegex { json } => {
            let regex = Dfa::from_table(&read_table(&json)?)?.to_regex().to_string();
            match format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "regex": regex })),
                _ => println!("{}", regex),
            }
        }
        Commands::Compare { left, right, n } => {
            let c = chomsky_toolkit::compare(
                &read_grammar(Some(left.as_path()))?,
                &read_grammar(Some(right.as_path()))?,
                n,
            );
            println!(
                "{}",
                match format {
                    OutputFormat::Plain => c.to_plaintext(),
                    OutputFormat::Latex => c.to_latex(),
                    OutputFormat::Json => to_json(&c),
                }
            );
        }
        Commands::Example { grammar_type } => {
            let t = ChomskyType::from_number(grammar_type)
                .ok_or_else(|| format!("no Chomsky type {}, expected 0 to 3", grammar_type))?;
            println!("{}", examples::example(t));
        }
        Commands::Samples => match format {
            OutputFormat::Json => println!("{}", to_json(&samples())),
            _ => {
                for table in samples() {
                    print_table(&table, format, false);
                    println!();
                }
            }
        },
        Commands::Tutor { answer } => {
            let mut rng = rand::thread_rng();
            let mut tutor = Tutor::new(move |n| rng.gen_range(0..n));
            println!("{}\n", tutor.new_exercise());
            let answer = match answer {
                Some(answer) => answer,
                None => {
                    print!("Type (0-3): ");
                    io::stdout().flush()?;
                    let mut line = String::new();
                    io::stdin().read_line(&mut line)?;
                    line.trim().parse::<u8>()?
                }
            };
            let (_, feedback) = tutor.check(answer);
            println!("{}", feedback);
        }
    }

    Ok(())
}
