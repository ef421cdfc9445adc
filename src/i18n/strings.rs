use super::language::Language;

/// Display strings for one interface language
#[derive(Debug)]
pub struct Strings {
    pub app_title: &'static str,
    /// Generic failure shown in place of an assistant reply
    pub error: &'static str,
    pub thinking: &'static str,
    pub welcome_title: &'static str,
    pub welcome_subtitle: &'static str,
    pub welcome_examples: &'static str,
    pub conversations: &'static str,
    pub new_conversation: &'static str,
    pub no_conversations: &'static str,
    pub create_new_to_start: &'static str,
    pub loading: &'static str,
    pub load_failed: &'static str,
    pub sources: &'static str,
    pub you: &'static str,
    pub assistant: &'static str,
}

const FR: Strings = Strings {
    app_title: "Assistant Administratif",
    error: "Désolé, une erreur s'est produite. Veuillez réessayer.",
    thinking: "L'assistant réfléchit...",
    welcome_title: "Bienvenue !",
    welcome_subtitle: "Posez vos questions sur les démarches administratives.",
    welcome_examples: "Exemples : passeport, carte d'identité, acte de naissance",
    conversations: "Conversations",
    new_conversation: "Nouvelle conversation",
    no_conversations: "Aucune conversation",
    create_new_to_start: "Créez une nouvelle conversation pour commencer",
    loading: "Chargement...",
    load_failed: "Impossible de charger la conversation.",
    sources: "Sources :",
    you: "Vous",
    assistant: "Assistant",
};

const AR: Strings = Strings {
    app_title: "المساعد الإداري",
    error: "عذرًا، حدث خطأ. يرجى المحاولة مرة أخرى.",
    thinking: "المساعد يفكر...",
    welcome_title: "مرحبًا!",
    welcome_subtitle: "اطرح أسئلتك حول الإجراءات الإدارية.",
    welcome_examples: "أمثلة: جواز السفر، البطاقة الوطنية، عقد الازدياد",
    conversations: "المحادثات",
    new_conversation: "محادثة جديدة",
    no_conversations: "لا توجد محادثات",
    create_new_to_start: "أنشئ محادثة جديدة للبدء",
    loading: "جارٍ التحميل...",
    load_failed: "تعذر تحميل المحادثة.",
    sources: "المصادر:",
    you: "أنت",
    assistant: "المساعد",
};

const AM: Strings = Strings {
    app_title: "ⴰⵎⵢⴰⵡⴰⵙ ⴰⵏⵙⴱⴱⴰⴹ",
    error: "ⵙⵓⵔⴼ, ⵜⵍⵍⴰ ⵜⵓⵛⵛⴹⴰ. ⴰⵍⵙ ⵜⴰⵔⵎⵉⵜ.",
    thinking: "ⴰⵎⵢⴰⵡⴰⵙ ⵉⵜⵜⵅⵎⵎⵉⵎ...",
    welcome_title: "ⴰⵣⵓⵍ!",
    welcome_subtitle: "ⵙⵇⵙⴰ ⵅⴼ ⵜⵉⴳⴰⵡⵉⵏ ⵜⵉⵏⵙⴱⴱⴰⴹⵉⵏ.",
    welcome_examples: "ⵉⵎⴷⵢⴰ: ⴰⵙⵓⵔⴰⵢ, ⵜⴰⴽⴰⵔⴹⴰ ⵏ ⵜⵎⴰⴳⵉⵜ",
    conversations: "ⵉⵎⵙⴰⵡⴰⵍⵏ",
    new_conversation: "ⴰⵎⵙⴰⵡⴰⵍ ⴰⵎⴰⵢⵏⵓ",
    no_conversations: "ⵓⵔ ⵍⵍⵉⵏ ⵉⵎⵙⴰⵡⴰⵍⵏ",
    create_new_to_start: "ⵙⵏⴼⵍⵓⵍ ⴰⵎⵙⴰⵡⴰⵍ ⴰⵎⴰⵢⵏⵓ",
    loading: "ⴰⵙⴰⵍⵉ...",
    load_failed: "ⵓⵔ ⵉⵜⵜⵡⴰⵙⴰⵍⴰ ⵓⵎⵙⴰⵡⴰⵍ.",
    sources: "ⵉⵙⴰⴳⵎⵓⵜⵏ:",
    you: "ⴽⵢⵢ",
    assistant: "ⴰⵎⵢⴰⵡⴰⵙ",
};

const EN: Strings = Strings {
    app_title: "Administrative Assistant",
    error: "Sorry, something went wrong. Please try again.",
    thinking: "The assistant is thinking...",
    welcome_title: "Welcome!",
    welcome_subtitle: "Ask your questions about administrative procedures.",
    welcome_examples: "Examples: passport, national ID card, birth certificate",
    conversations: "Conversations",
    new_conversation: "New conversation",
    no_conversations: "No conversations yet",
    create_new_to_start: "Start a new conversation to begin",
    loading: "Loading...",
    load_failed: "Could not load the conversation.",
    sources: "Sources:",
    you: "You",
    assistant: "Assistant",
};

/// Look up the string table for a language
pub fn strings(language: Language) -> &'static Strings {
    match language {
        Language::Fr => &FR,
        Language::Ar => &AR,
        Language::Am => &AM,
        Language::En => &EN,
    }
}
