//! Chat command dispatch.
//!
//! Messages look like `/command[@botname] [argument text]`. Every command has
//! its own handler on [`Bot`]; [`Bot::handle_message`] only decides which one
//! runs. Handlers answer user mistakes with a localized [`Reply`] and reserve
//! `Err` for storage failures.

use tracing::debug;

use crate::db::{Database, ReopenOutcome};
use crate::error::Result;
use crate::fields::{parse_done_filter, ClearScope, Locale};
use crate::render::{format_flat, format_outline};
use crate::tree::collect_descendants;

/// An inline button attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    /// Payload handed back to [`Bot::handle_callback`] when pressed.
    pub data: String,
}

/// What the bot sends back for one message or button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Vec<Button>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    pub fn with_keyboard(mut self, keyboard: Vec<Button>) -> Self {
        self.keyboard = keyboard;
        self
    }
}

/// A parsed chat command and its raw argument text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Create(&'a str),
    List(&'a str),
    Find(&'a str),
    Done(&'a str),
    Reopen(&'a str),
    Clear,
    Help,
    Unknown,
}

/// Split a message into a command.
///
/// Returns `None` for blank messages and for commands addressed to another bot
/// (`/list@otherbot`), which are not ours to answer.
pub fn parse_command<'a>(message: &'a str, bot_name: Option<&str>) -> Option<Command<'a>> {
    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    let Some(body) = message.strip_prefix('/') else {
        return Some(Command::Unknown);
    };

    let (head, args) = match body.find(char::is_whitespace) {
        Some(pos) => (&body[..pos], body[pos..].trim()),
        None => (body, ""),
    };
    let (word, mention) = match head.split_once('@') {
        Some((word, mention)) => (word, Some(mention)),
        None => (head, None),
    };
    if let (Some(mention), Some(name)) = (mention, bot_name) {
        if !mention.eq_ignore_ascii_case(name.trim_start_matches('@')) {
            return None;
        }
    }

    let command = match word.to_lowercase().as_str() {
        "todo" | "create" => Command::Create(args),
        "list" => Command::List(args),
        "find" => Command::Find(args),
        "done" => Command::Done(args),
        "reopen" => Command::Reopen(args),
        "clear" => Command::Clear,
        "help" | "start" => Command::Help,
        _ => Command::Unknown,
    };
    Some(command)
}

/// The command handlers, bound to one task store and one reply language.
#[derive(Debug)]
pub struct Bot {
    db: Database,
    locale: Locale,
    name: Option<String>,
}

impl Bot {
    pub fn new(db: Database, locale: Locale) -> Self {
        Bot {
            db,
            locale,
            name: None,
        }
    }

    /// Only answer `/command@name` mentions that carry this name.
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Route one chat message to its handler.
    pub fn handle_message(&self, message: &str) -> Result<Option<Reply>> {
        let Some(command) = parse_command(message, self.name.as_deref()) else {
            return Ok(None);
        };
        debug!(?command, "handling chat command");
        let reply = match command {
            Command::Create(args) => self.create_task(args)?,
            Command::List(args) => self.list_tasks(args)?,
            Command::Find(args) => self.find_tasks(args)?,
            Command::Done(args) => self.finish_tasks(args)?,
            Command::Reopen(args) => self.reopen_task(args)?,
            Command::Clear => self.clear_prompt(),
            Command::Help => self.help(),
            Command::Unknown => Reply::text(self.locale.unknown_command()),
        };
        Ok(Some(reply))
    }

    /// Handle a press of one of the inline buttons sent earlier.
    pub fn handle_callback(&self, data: &str) -> Result<Reply> {
        debug!(data, "handling button press");
        match ClearScope::from_callback_data(data) {
            Some(scope) => self.clear(scope),
            None => Ok(Reply::text(self.locale.unknown_action())),
        }
    }

    /// `/todo <text>`
    pub fn create_task(&self, args: &str) -> Result<Reply> {
        let text = args.trim();
        if text.is_empty() {
            return Ok(Reply::text(self.locale.create_usage()));
        }
        let id = self.db.add_task(text)?;
        Ok(Reply::text(self.locale.task_added(id)))
    }

    /// Done-state filter named by a `/list` argument, or the usage reply when
    /// the argument is not one.
    pub fn list_filter(&self, args: &str) -> std::result::Result<Option<bool>, Reply> {
        let args = args.trim();
        if args.is_empty() {
            return Ok(None);
        }
        parse_done_filter(args)
            .map(Some)
            .ok_or_else(|| Reply::text(self.locale.list_usage()))
    }

    /// The trimmed `/find` query, or the usage reply when it is blank.
    pub fn find_query<'q>(&self, args: &'q str) -> std::result::Result<&'q str, Reply> {
        let query = args.trim();
        if query.is_empty() {
            Err(Reply::text(self.locale.find_usage()))
        } else {
            Ok(query)
        }
    }

    /// `/list [filter]`
    pub fn list_tasks(&self, args: &str) -> Result<Reply> {
        let filter = match self.list_filter(args) {
            Ok(filter) => filter,
            Err(usage) => return Ok(usage),
        };
        let tasks = self.db.get_list(filter)?;
        if tasks.is_empty() {
            return Ok(Reply::text(self.locale.no_tasks()));
        }
        Ok(Reply::text(format_outline(&tasks)))
    }

    /// `/find <query>`
    pub fn find_tasks(&self, args: &str) -> Result<Reply> {
        let query = match self.find_query(args) {
            Ok(query) => query,
            Err(usage) => return Ok(usage),
        };
        let tasks = self.db.find_tasks(query)?;
        if tasks.is_empty() {
            return Ok(Reply::text(self.locale.nothing_found(query)));
        }
        Ok(Reply::text(format_flat(&tasks)))
    }

    /// `/done <id> [id...]`, cascading to every descendant.
    pub fn finish_tasks(&self, args: &str) -> Result<Reply> {
        let Some(ids) = parse_ids(args) else {
            return Ok(Reply::text(self.locale.invalid_task_number()));
        };
        self.db.finish_tasks(&ids)?;
        let tasks = self.db.get_list(None)?;
        let subtasks = collect_descendants(&tasks, &ids);
        self.db.finish_tasks(&subtasks)?;
        Ok(Reply::text(self.locale.tasks_done(&ids, &subtasks)))
    }

    /// `/reopen <id>`, without cascade.
    pub fn reopen_task(&self, args: &str) -> Result<Reply> {
        let arg = args.trim();
        if arg.is_empty() {
            return Ok(Reply::text(self.locale.reopen_usage()));
        }
        let Ok(id) = arg.parse::<i64>() else {
            return Ok(Reply::text(self.locale.invalid_reopen_id()));
        };
        let text = match self.db.reopen(id)? {
            ReopenOutcome::NotFound => self.locale.task_not_found(),
            ReopenOutcome::AlreadyOpen => self.locale.task_already_open(),
            ReopenOutcome::Reopened => self.locale.task_reopened(),
        };
        Ok(Reply::text(text))
    }

    /// `/clear`: ask which tasks to delete.
    pub fn clear_prompt(&self) -> Reply {
        let keyboard = [ClearScope::All, ClearScope::Completed]
            .into_iter()
            .map(|scope| Button {
                label: self.locale.clear_button(scope).to_string(),
                data: scope.callback_data().to_string(),
            })
            .collect();
        Reply::text(self.locale.clear_prompt()).with_keyboard(keyboard)
    }

    /// Delete the tasks chosen in the `/clear` prompt.
    pub fn clear(&self, scope: ClearScope) -> Result<Reply> {
        self.db.clear(scope.done_filter())?;
        Ok(Reply::text(self.locale.tasks_deleted()))
    }

    /// `/help` and `/start`
    pub fn help(&self) -> Reply {
        Reply::text(self.locale.help())
    }
}

/// Parse whitespace-separated task ids; `None` if any is not an integer or
/// none are given.
fn parse_ids(args: &str) -> Option<Vec<i64>> {
    let ids = args
        .split_whitespace()
        .map(|s| s.parse::<i64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .ok()?;
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ROOT_PARENT;

    fn bot() -> Bot {
        Bot::new(Database::open_in_memory().unwrap(), Locale::En)
    }

    fn say(bot: &Bot, message: &str) -> Reply {
        bot.handle_message(message).unwrap().expect("bot should answer")
    }

    /// A(1) > B(2) > C(3), D(4)
    fn nested_bot() -> Bot {
        let bot = bot();
        let db = bot.database();
        db.add_task("A").unwrap();
        db.insert("B", 1).unwrap();
        db.insert("C", 2).unwrap();
        db.add_task("D").unwrap();
        bot
    }

    fn done_ids(bot: &Bot) -> Vec<i64> {
        bot.database()
            .get_list(Some(true))
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect()
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/todo buy milk ", None), Some(Command::Create("buy milk")));
        assert_eq!(parse_command("/LIST", None), Some(Command::List("")));
        assert_eq!(parse_command("/done\t1  3", None), Some(Command::Done("1  3")));
        assert_eq!(parse_command("/start", None), Some(Command::Help));
        assert_eq!(parse_command("/frobnicate", None), Some(Command::Unknown));
        assert_eq!(parse_command("hello", None), Some(Command::Unknown));
        assert_eq!(parse_command("   ", None), None);
    }

    #[test]
    fn test_parse_command_mentions() {
        assert_eq!(
            parse_command("/find@todo_bot socks", Some("todo_bot")),
            Some(Command::Find("socks"))
        );
        assert_eq!(parse_command("/find@Todo_Bot socks", Some("@todo_bot")), Some(Command::Find("socks")));
        assert_eq!(parse_command("/find@other_bot socks", Some("todo_bot")), None);
        assert_eq!(parse_command("/clear@anyone", None), Some(Command::Clear));
    }

    #[test]
    fn test_create_replies_with_id_and_makes_root() {
        let bot = bot();
        assert_eq!(say(&bot, "/todo find socks").text, "Task added: 1");
        let tasks = bot.database().get_list(None).unwrap();
        assert_eq!(tasks[0].text, "find socks");
        assert_eq!(tasks[0].parent_id, ROOT_PARENT);
    }

    #[test]
    fn test_create_rejects_blank_text() {
        let bot = bot();
        assert_eq!(say(&bot, "/todo    ").text, Locale::En.create_usage());
        assert!(bot.database().get_list(None).unwrap().is_empty());
    }

    #[test]
    fn test_list_renders_outline() {
        let bot = nested_bot();
        assert_eq!(
            say(&bot, "/list").text,
            "1: A | ❌\n  2: B | ❌\n    3: C | ❌\n4: D | ❌"
        );
    }

    #[test]
    fn test_list_filters_and_empty_states() {
        let bot = bot();
        assert_eq!(say(&bot, "/list").text, "You have no tasks!");

        let bot = nested_bot();
        bot.database().finish_tasks(&[4]).unwrap();
        assert_eq!(say(&bot, "/list True").text, "4: D | ✅");
        assert_eq!(
            say(&bot, "/list false").text,
            "1: A | ❌\n  2: B | ❌\n    3: C | ❌"
        );
        assert_eq!(say(&bot, "/list groceries").text, Locale::En.list_usage());
    }

    #[test]
    fn test_list_with_parent_filtered_out_keeps_child_at_root() {
        let bot = nested_bot();
        bot.database().finish_tasks(&[1]).unwrap();
        assert_eq!(say(&bot, "/list false").text, "2: B | ❌\n  3: C | ❌\n4: D | ❌");
    }

    #[test]
    fn test_find() {
        let bot = nested_bot();
        assert_eq!(say(&bot, "/find b").text, "2: B | ❌");
        assert_eq!(say(&bot, "/find zzz").text, "No tasks matching \"zzz\" found!");
        assert_eq!(say(&bot, "/find   ").text, Locale::En.find_usage());
    }

    #[test]
    fn test_done_cascades_to_descendants() {
        let bot = nested_bot();
        assert_eq!(say(&bot, "/done 1").text, "Completed tasks: [1] and subtasks: [2, 3]");
        assert_eq!(done_ids(&bot), vec![1, 2, 3]);
    }

    #[test]
    fn test_done_without_children() {
        let bot = nested_bot();
        assert_eq!(say(&bot, "/done 4 3").text, "Completed tasks: [4, 3]");
        assert_eq!(done_ids(&bot), vec![3, 4]);
    }

    #[test]
    fn test_done_rejects_bad_ids() {
        let bot = nested_bot();
        assert_eq!(say(&bot, "/done 1 two").text, "Invalid task number");
        assert_eq!(say(&bot, "/done").text, "Invalid task number");
        assert!(done_ids(&bot).is_empty());
    }

    #[test]
    fn test_reopen_does_not_cascade() {
        let bot = nested_bot();
        say(&bot, "/done 1");
        assert_eq!(say(&bot, "/reopen 2").text, "Task reopened.");
        assert_eq!(done_ids(&bot), vec![1, 3]);
        assert_eq!(say(&bot, "/reopen 2").text, "The task is already open.");
        assert_eq!(say(&bot, "/reopen 77").text, "No task with that id.");
        assert_eq!(say(&bot, "/reopen").text, Locale::En.reopen_usage());
        assert_eq!(say(&bot, "/reopen x").text, Locale::En.invalid_reopen_id());
    }

    #[test]
    fn test_clear_prompt_and_callbacks() {
        let bot = nested_bot();
        let prompt = say(&bot, "/clear");
        assert_eq!(prompt.text, "Do you want to delete your tasks?");
        let data: Vec<&str> = prompt.keyboard.iter().map(|b| b.data.as_str()).collect();
        assert_eq!(data, vec!["clear:all", "clear:completed"]);
        // Nothing is deleted until a button is pressed.
        assert_eq!(bot.database().get_list(None).unwrap().len(), 4);

        say(&bot, "/done 2");
        assert_eq!(bot.handle_callback("clear:completed").unwrap().text, "Tasks deleted!");
        let left: Vec<i64> = bot.database().get_list(None).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(left, vec![1, 4]);

        bot.handle_callback("clear:all").unwrap();
        assert!(bot.database().get_list(None).unwrap().is_empty());

        assert_eq!(bot.handle_callback("bogus").unwrap().text, Locale::En.unknown_action());
    }

    #[test]
    fn test_help_and_unknown() {
        let bot = Bot::new(Database::open_in_memory().unwrap(), Locale::Ru);
        assert_eq!(say(&bot, "/help").text, Locale::Ru.help());
        assert_eq!(say(&bot, "/start").text, Locale::Ru.help());
        assert_eq!(say(&bot, "/todo Найти носки").text, "Задача добавлена: 1");
        assert_eq!(say(&bot, "привет").text, Locale::Ru.unknown_command());
    }

    #[test]
    fn test_list_filter_and_find_query() {
        let bot = bot();
        assert_eq!(bot.list_filter("  "), Ok(None));
        assert_eq!(bot.list_filter("done"), Ok(Some(true)));
        assert_eq!(bot.list_filter("later"), Err(Reply::text(Locale::En.list_usage())));
        assert_eq!(bot.find_query("  socks "), Ok("socks"));
        assert_eq!(bot.find_query("\t"), Err(Reply::text(Locale::En.find_usage())));
    }

    #[test]
    fn test_done_with_huge_id_list() {
        let bot = nested_bot();
        let ids: Vec<String> = (1..=40_000).map(|id| id.to_string()).collect();
        let reply = say(&bot, &format!("/done {}", ids.join(" ")));
        assert!(reply.text.starts_with("Completed tasks: [1, 2, 3"));
        assert_eq!(done_ids(&bot), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_storage_failure_is_an_error_not_a_reply() {
        let bot = nested_bot();
        bot.database().break_storage();
        assert!(bot.handle_message("/list").is_err());
        assert!(bot.handle_message("/todo buy milk").is_err());
        assert!(bot.handle_message("/done 1").is_err());
        assert!(bot.handle_callback("clear:all").is_err());
        // Input mistakes are still answered before storage is touched.
        assert_eq!(say(&bot, "/find  ").text, Locale::En.find_usage());
        assert_eq!(say(&bot, "/help").text, Locale::En.help());
    }

    #[test]
    fn test_ignores_other_bots() {
        let bot = bot().with_name(Some("todo_bot".into()));
        assert!(bot.handle_message("/list@someone_else").unwrap().is_none());
        assert!(bot.handle_message("/list@todo_bot").unwrap().is_some());
    }
}
