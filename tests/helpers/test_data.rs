//! Test data

/// Sender used by the reference onboarding scenario
pub const SENDER: &str = "+1555";

/// Messages answering the four profile questions
pub const PROFILE_ANSWERS: [&str; 4] = ["João", "Administração", "3", "marketing"];

pub const GREETING: &str = "Olá! Sou o Pjotinha, seu instrutor no curso Meu Primeiro CNPJ! Qual o seu nome?";
pub const PROFILE_DONE: &str = "Perfil concluído! Está pronto para começar? Digite *continuar* para iniciar!";
pub const APOLOGY: &str = "Desculpe, tive um problema técnico. Pode perguntar novamente?";
pub const INVALID_INPUT: &str = "Mensagem inválida. Envie um texto para continuarmos.";
pub const GENERIC_ERROR: &str = "Desculpe, algo deu errado por aqui. Tente novamente mais tarde.";

/// Quiz completion whose correct answer is `answer`
pub fn quiz_json(answer: &str) -> String {
    format!(
        r#"{{"question": "O que significa CNPJ?", "options": ["Cadastro Nacional da Pessoa Jurídica", "Conselho Nacional de Pequenos Juristas", "Cadastro de Negócios Populares", "Certificado Nacional de Pessoa Jovem"], "answer": "{}"}}"#,
        answer
    )
}

/// Module text with one clearly labelled paragraph per part
pub fn module_text(module: u32) -> String {
    (1..=4)
        .map(|part| format!("Módulo {} parte {}: conteúdo de teste.", module, part))
        .collect::<Vec<_>>()
        .join("\n\n")
}
