use crate::commands::{feed, notifications, search, social};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "feed",
            groups: feed::EXAMPLES,
        },
        CommandExample {
            name: "search",
            groups: search::EXAMPLES,
        },
        CommandExample {
            name: "follow",
            groups: social::FOLLOW_EXAMPLES,
        },
        CommandExample {
            name: "unfollow",
            groups: social::UNFOLLOW_EXAMPLES,
        },
        CommandExample {
            name: "followers",
            groups: social::LIST_EXAMPLES,
        },
        CommandExample {
            name: "following",
            groups: social::LIST_EXAMPLES,
        },
        CommandExample {
            name: "notifications",
            groups: notifications::EXAMPLES,
        },
    ]
}
