//! Reply texts in every supported language.

use crate::fields::{ClearScope, Locale};

impl Locale {
    pub fn task_added(self, id: i64) -> String {
        match self {
            Locale::En => format!("Task added: {id}"),
            Locale::Ru => format!("Задача добавлена: {id}"),
        }
    }

    pub fn create_usage(self) -> &'static str {
        match self {
            Locale::En => "Enter the task text: /todo <text>",
            Locale::Ru => "Укажите текст задачи: /todo <текст>",
        }
    }

    pub fn no_tasks(self) -> &'static str {
        match self {
            Locale::En => "You have no tasks!",
            Locale::Ru => "У вас нет задач!",
        }
    }

    pub fn list_usage(self) -> &'static str {
        match self {
            Locale::En => "Unknown filter. Use \"/list True\" for completed or \"/list False\" for open tasks.",
            Locale::Ru => "Неизвестный фильтр. \"/list True\" покажет завершенные, \"/list False\" незавершенные задачи.",
        }
    }

    pub fn find_usage(self) -> &'static str {
        match self {
            Locale::En => "Enter text to search for: /find <word|phrase>",
            Locale::Ru => "Укажите текст для поиска: /find <слово|фраза>",
        }
    }

    pub fn nothing_found(self, query: &str) -> String {
        match self {
            Locale::En => format!("No tasks matching \"{query}\" found!"),
            Locale::Ru => format!("Задачи по условию \"{query}\" не найдены!"),
        }
    }

    pub fn tasks_done(self, ids: &[i64], subtasks: &[i64]) -> String {
        match (self, subtasks.is_empty()) {
            (Locale::En, true) => format!("Completed tasks: {ids:?}"),
            (Locale::En, false) => format!("Completed tasks: {ids:?} and subtasks: {subtasks:?}"),
            (Locale::Ru, true) => format!("Завершенные задачи: {ids:?}"),
            (Locale::Ru, false) => format!("Завершенные задачи: {ids:?} и подзадачи: {subtasks:?}"),
        }
    }

    pub fn invalid_task_number(self) -> &'static str {
        match self {
            Locale::En => "Invalid task number",
            Locale::Ru => "Неправильный номер задачи",
        }
    }

    pub fn reopen_usage(self) -> &'static str {
        match self {
            Locale::En => "Enter the task id: /reopen <id>",
            Locale::Ru => "Укажите id задачи: /reopen <id>",
        }
    }

    pub fn invalid_reopen_id(self) -> &'static str {
        match self {
            Locale::En => "Invalid id. A whole task number is required.",
            Locale::Ru => "Некорректный id. Нужен целый номер задачи.",
        }
    }

    pub fn task_not_found(self) -> &'static str {
        match self {
            Locale::En => "No task with that id.",
            Locale::Ru => "Задача с таким id не найдена.",
        }
    }

    pub fn task_already_open(self) -> &'static str {
        match self {
            Locale::En => "The task is already open.",
            Locale::Ru => "Задача уже открыта.",
        }
    }

    pub fn task_reopened(self) -> &'static str {
        match self {
            Locale::En => "Task reopened.",
            Locale::Ru => "Задача переоткрыта.",
        }
    }

    pub fn clear_prompt(self) -> &'static str {
        match self {
            Locale::En => "Do you want to delete your tasks?",
            Locale::Ru => "Вы хотите удалить ваши задачи?",
        }
    }

    /// Caption of the inline button for `scope`.
    pub fn clear_button(self, scope: ClearScope) -> &'static str {
        match (self, scope) {
            (Locale::En, ClearScope::All) => "Delete all!",
            (Locale::En, ClearScope::Completed) => "Completed only",
            (Locale::Ru, ClearScope::All) => "Удалить все!",
            (Locale::Ru, ClearScope::Completed) => "Только завершенные",
        }
    }

    pub fn tasks_deleted(self) -> &'static str {
        match self {
            Locale::En => "Tasks deleted!",
            Locale::Ru => "Задачи удалены!",
        }
    }

    pub fn unknown_action(self) -> &'static str {
        match self {
            Locale::En => "This button is no longer valid.",
            Locale::Ru => "Эта кнопка больше не действует.",
        }
    }

    pub fn unknown_command(self) -> &'static str {
        match self {
            Locale::En => "Unknown command. Send /help to see what I can do.",
            Locale::Ru => "Неизвестная команда. Отправьте /help, чтобы увидеть список команд.",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Locale::En => concat!(
                "ToDo bot - a task manager.\n\n",
                "/todo - type the command and a task description to add it to the list. Example: \"/todo find socks\"\n\n",
                "/list - shows the task list with task numbers; \"/list True\" or \"/list False\" shows completed or open tasks respectively\n\n",
                "/find - search tasks by keyword. Example: \"/find socks\" shows tasks mentioning socks\n\n",
                "/done - the command and task numbers mark tasks and their subtasks as done. Example: \"/done 1 3\" completes tasks 1 and 3 and their subtasks\n\n",
                "/reopen - reopen a task. Example: \"/reopen 1\"\n\n",
                "/clear - delete tasks, all or only completed ones",
            ),
            Locale::Ru => concat!(
                "ToDo бот - менеджер задач.\n\n",
                "/todo - наберите команду и описание задачи и она добавится в список. Например: \"/todo найти носки\"\n\n",
                "/list - покажет список задач и их номера \"/list True\" или \"/list False\" покажет завершенные и не завершенные задачи соответственно\n\n",
                "/find - поиск задачи по ключевому слову. Например: \"/find найти\" покажет задачи в которых упоминается слово найти\n\n",
                "/done - команда и номер задачи отметит задачу и подзадачи как выполненные. Например: \"/done 1 3\" - команда отметит выполненными задания 1 и 3 и их подзадачи\n\n",
                "/reopen - переоткрыть задачу. Например: \"/reopen 1\"\n\n",
                "/clear - удаление задач, всех или только выполненных",
            ),
        }
    }
}
