//! Rule-based responder engine.
//!
//! Maps a visitor message to one automated action: a canned reply or a
//! navigation link. Matching is an ordered rule table evaluated
//! top-to-bottom over the lowercased text; any trigger being a substring of
//! the message fires the rule, and the first match wins. Rule order is
//! load-bearing: cancel/return-to-bot phrases must be checked before topic
//! phrases that share keywords.
//!
//! Trigger sets contain known overlaps (e.g. "team" appears under both jobs
//! and about); the fixed order resolves them. Fully deterministic and
//! synchronous -- no external calls, no randomness.

/// Action produced by the responder for a visitor message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderAction {
    /// A plain-text canned reply.
    Reply(String),
    /// A navigation shortcut to an internal section of the site.
    Link { label: String, url: String },
}

enum RuleAction {
    Reply(&'static str),
    Link {
        label: &'static str,
        url: &'static str,
    },
}

struct Rule {
    triggers: &'static [&'static str],
    action: RuleAction,
}

/// Fallback when no rule fires: acknowledge and hand off to an operator.
const FALLBACK_REPLY: &str = "Спасибо за сообщение! Я передам его оператору. \
    Если у вас есть срочный вопрос, опишите подробнее.";

/// The ordered rule table. Triggers are lowercase; order is the contract.
const RULES: &[Rule] = &[
    // 1. Cancel an operator escalation, return to the assistant.
    Rule {
        triggers: &[
            "вернись",
            "отмена",
            "cancel",
            "отменить",
            "back",
            "к боту",
            "ai only",
            "отменить оператора",
        ],
        action: RuleAction::Reply(
            "Хорошо, я снова с вами! Диалог с оператором отменён. Чем могу помочь дальше?",
        ),
    },
    // 2. Greetings.
    Rule {
        triggers: &["привет", "здравствуй", "hello", "hi"],
        action: RuleAction::Reply(
            "Привет! Рад вас видеть в Nebula. Чем могу помочь с приложением?",
        ),
    },
    // 3. Download / install / platform questions.
    Rule {
        triggers: &[
            "скачать",
            "скачивание",
            "download",
            "где найти",
            "установить",
            "app",
            "приложение",
            "ios",
            "android",
            "windows",
            "macos",
            "intel",
            "apple m",
            "установка",
            "инсталл",
            "загрузить",
            "get app",
            "mobile app",
            "desktop app",
            "программа",
            "software",
            "apk",
            "ipa",
            "exe",
            "dmg",
            "где скачать",
            "link to download",
            "install guide",
            "how to install",
            "app store",
            "play store",
            "microsoft store",
            "mac app store",
            "nebula app",
            "nebula download",
            "version",
            "update app",
            "latest version",
            "beta",
            "release",
            "setup",
            "run",
            "launch",
            "mobile",
            "desktop",
            "pc",
            "mac",
            "phone",
            "tablet",
        ],
        action: RuleAction::Link {
            label: "Перейдите в раздел Скачать",
            url: "/download",
        },
    },
    // 4. Subscription / payment / pricing.
    Rule {
        triggers: &["подписка", "оплата", "buy", "покупка", "цен", "стоимость"],
        action: RuleAction::Reply(
            "Подписка Nebula: 499₽/мес (РФ, скоро международно). Включает стримы, AI, \
             премиум. Оплатить картой в приложении. Проблемы с оплатой? Укажите детали.",
        ),
    },
    // 5. Jobs / careers.
    Rule {
        triggers: &[
            "вакансия",
            "работа",
            "job",
            "резюме",
            "карьера",
            "найм",
            "работа в nebula",
            "employment",
            "hire",
            "career",
            "positions",
            "openings",
            "vacancy",
            "job opening",
            "apply",
            "отклик",
            "соискатель",
            "hr",
            "recruitment",
            "staff",
            "team",
            "join team",
            "работать",
            "зарплата",
            "условия",
            "интервью",
            "frontend",
            "backend",
            "devops",
            "designer",
            "engineer",
            "developer",
            "programmer",
            "software engineer",
            "ml",
            "ai",
            "data scientist",
            "mobile dev",
            "react",
            "node",
            "python",
            "fullstack",
            "internship",
            "стажировка",
            "junior",
            "senior",
            "lead",
            "manager",
            "community",
        ],
        action: RuleAction::Link {
            label: "Перейдите в раздел Вакансии",
            url: "/jobs",
        },
    },
    // 6. Streams / sports troubleshooting.
    Rule {
        triggers: &[
            "стрим",
            "трансляция",
            "stream",
            "watch",
            "матч",
            "футбол",
            "баскетбол",
        ],
        action: RuleAction::Reply(
            "Стримы в Nebula: футбол, баскетбол, live. Проблемы? Проверьте интернет \
             (минимум 5Mbps), обновите app. Укажите матч или ошибку для помощи.",
        ),
    },
    // 7. Generic help / problem reports.
    Rule {
        triggers: &["помощь", "проблема", "help", "issue", "ошибка", "не работает"],
        action: RuleAction::Reply(
            "Опишите проблему подробнее: что не работает (скачивание, стрим, подписка)? \
             Я помогу или подключу оператора.",
        ),
    },
    // 8. About the company.
    Rule {
        triggers: &[
            "о нас",
            "о вас",
            "about",
            "компания",
            "nebula что",
            "о nebula",
            "что nebula",
            "who we are",
            "кто мы",
            "информация",
            "info",
            "history",
            "история",
            "mission",
            "миссия",
            "vision",
            "team",
            "команда",
            "founders",
            "основатели",
            "product",
            "продукт",
            "services",
            "услуги",
            "features",
            "функции",
            "what is nebula",
            "что такое nebula",
            "nebula app",
            "о проекте",
            "project",
            "startup",
            "company info",
            "profile",
            "официальный сайт",
            "official",
            "overview",
            "обзор",
            "description",
            "описание",
            "background",
            "фон",
            "story",
            "история компании",
            "corporate",
            "бизнес",
            "enterprise",
            "brand",
            "о компании",
            "компания nebula",
            "nebula company",
            "что за nebula",
            "зачем nebula",
            "для чего nebula",
            "инфо nebula",
            "nebula info",
            "о небула",
            "небула",
            "about us",
            "us",
            "мы",
            "developers",
            "разработчики",
            "creator",
            "создатель",
            "origin",
            "происхождение",
        ],
        action: RuleAction::Link {
            label: "Перейдите в раздел О нас",
            url: "/about",
        },
    },
    // 9. Contact / support / social channels.
    Rule {
        triggers: &[
            "контакты",
            "contact",
            "email",
            "поддержка",
            "support",
            "help",
            "помощь",
            "feedback",
            "обратная связь",
            "пишите",
            "write",
            "address",
            "адрес",
            "phone",
            "телефон",
            "call",
            "звонок",
            "social",
            "социальные сети",
            "telegram",
            "twitter",
            "instagram",
            "vk",
            "youtube",
            "location",
            "где мы",
            "office",
            "офис",
            "map",
            "карта",
            "faq",
            "вопросы",
            "answers",
            "report",
            "жалоба",
            "bug",
            "issue",
            "problem",
            "complaint",
            "suggestion",
            "предложение",
            "idea",
            "идея",
            "reach out",
            "get in touch",
            "connect",
            "communication",
            "channel",
            "канал",
        ],
        action: RuleAction::Link {
            label: "Перейдите в раздел Контакты",
            url: "/contact",
        },
    },
    // 10. Home / navigation.
    Rule {
        triggers: &[
            "домой",
            "главная",
            "home",
            "начало",
            "main",
            "start",
            "welcome",
            "приветствие",
            "landing",
            "overview",
            "обзор",
            "index",
            "root",
            "front page",
            "homepage",
            "начало работы",
            "get started",
            "demo",
            "показать",
            "show me",
            "what is this",
            "что это",
            "tour",
            "экскурсия",
            "intro",
            "introduction",
            "dashboard",
            "панель",
            "main menu",
            "меню",
            "navigate",
            "навигация",
            "back to home",
            "вернуться",
            "reset",
            "очистить",
            "fresh start",
            "новый",
            "first page",
            "первая страница",
            "site map",
            "карта сайта",
            "browse",
            "просмотр",
            "explore",
            "исследовать",
            "main site",
            "сайт",
            "web",
            "веб",
        ],
        action: RuleAction::Link {
            label: "Перейдите на главную страницу",
            url: "/",
        },
    },
];

/// Produce the automated action for a visitor message.
///
/// Deterministic: the same input always yields the same action.
pub fn respond(text: &str) -> ResponderAction {
    let lowered = text.to_lowercase();
    for rule in RULES {
        if rule.triggers.iter().any(|t| lowered.contains(t)) {
            return match rule.action {
                RuleAction::Reply(reply) => ResponderAction::Reply(reply.to_string()),
                RuleAction::Link { label, url } => ResponderAction::Link {
                    label: label.to_string(),
                    url: url.to_string(),
                },
            };
        }
    }
    ResponderAction::Reply(FALLBACK_REPLY.to_string())
}
