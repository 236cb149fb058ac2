use navigator::NodeGraph;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Quit,
    Back,
    Up,
    Start,
    Help,
    /// 1-based index into the listed children.
    Pick(usize),
    /// A node id typed directly (`2`, `d-2-242`, `m-4-1201`).
    Id(String),
}

pub fn parse(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "q" | "quit" | "exit" => Input::Quit,
        "b" | "back" => Input::Back,
        "u" | "up" => Input::Up,
        "s" | "start" => Input::Start,
        "?" | "h" | "help" => Input::Help,
        _ => {
            if let Some(rest) = line.strip_prefix('#')
                && let Ok(n) = rest.parse::<usize>()
            {
                return Input::Id(n.to_string());
            }
            match line.parse::<usize>() {
                Ok(n) if n > 0 => Input::Pick(n),
                _ => Input::Id(line.to_string()),
            }
        }
    }
}

/// Id of the `n`-th listed child of the current node.
pub fn child_id(nav: &NodeGraph, n: usize) -> Option<String> {
    nav.children().get(n.checked_sub(1)?).map(|node| node.id.clone())
}

pub const HELP: &str = "\
<n>      pick the n-th entry
#<id>    jump to a canton by number, or type any node id (d-2-242, m-4-1201)
b        back
u        up to the parent
s        start the quiz
q        quit";
