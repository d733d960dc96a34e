#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    New(String),
    Continue,
    Tree,
    Cat(String),
    Touch(String),
    Mkdir(String),
    Rm(String),
    Save,
    Projects,
    Load(String),
    Export(Option<String>),
    Import(String),
    Write(Option<String>),
    Exec(String),
    Help,
    Quit,
    /// Known command missing its required argument.
    Usage(&'static str),
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Type a description to generate a project; once a project is finished, plain
text asks for changes to it.

  /new <prompt>     start a fresh project
  /continue         resume an interrupted generation
  /tree             show the file tree
  /cat <path>       print a file
  /touch <path>     create an empty file
  /mkdir <path>     create a folder
  /rm <path>        delete a file or folder
  /save             save the project
  /projects         list saved projects
  /load <id>        open a saved project
  /export [path]    write the project as a ZIP archive
  /import <path>    open a ZIP archive as a project
  /write [dir]      write the project files to disk
  /exec <message>   send a message to the code-execution chat
  /help             show this help
  /quit             exit

Ctrl-C interrupts a running generation; Ctrl-D exits.";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let required = |usage: &'static str, build: fn(String) -> SlashCommand| match &argument {
        Some(value) => build(value.clone()),
        None => SlashCommand::Usage(usage),
    };

    let parsed = match command {
        "/new" => required("/new <prompt>", SlashCommand::New),
        "/continue" => SlashCommand::Continue,
        "/tree" => SlashCommand::Tree,
        "/cat" => required("/cat <path>", SlashCommand::Cat),
        "/touch" => required("/touch <path>", SlashCommand::Touch),
        "/mkdir" => required("/mkdir <path>", SlashCommand::Mkdir),
        "/rm" => required("/rm <path>", SlashCommand::Rm),
        "/save" => SlashCommand::Save,
        "/projects" => SlashCommand::Projects,
        "/load" => required("/load <id>", SlashCommand::Load),
        "/export" => SlashCommand::Export(argument),
        "/import" => required("/import <path>", SlashCommand::Import),
        "/write" => SlashCommand::Write(argument),
        "/exec" => required("/exec <message>", SlashCommand::Exec),
        "/help" => SlashCommand::Help,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}
