//! Keyword-matched canned responses for the portal chatbot.
//!
//! No NLU and no state: the incoming message is normalized (lowercased,
//! accents stripped) and matched by substring against a fixed keyword list.
//! The first matching entry wins; unmatched messages get the fallback answer.

struct CannedResponse {
    keywords: &'static [&'static str],
    answer: &'static str,
}

const RESPONSES: &[CannedResponse] = &[
    CannedResponse {
        keywords: &["ola", "oi", "bom dia", "boa tarde", "boa noite"],
        answer: "Olá! Sou o assistente virtual do portal. Como posso ajudar você hoje?",
    },
    CannedResponse {
        keywords: &["senha", "password", "esqueci"],
        answer: "Para redefinir sua senha, use a opção \"Esqueci minha senha\" na tela de login. Você receberá um link de redefinição por e-mail.",
    },
    CannedResponse {
        keywords: &["dashboard", "painel", "relatorio"],
        answer: "Seus dashboards ficam disponíveis na página inicial do portal. Se algum painel não aparecer, verifique com o administrador da sua empresa.",
    },
    CannedResponse {
        keywords: &["chamado", "ticket", "suporte", "problema", "erro"],
        answer: "Você pode abrir um chamado de suporte na seção \"Suporte\" do portal. Nossa equipe responde em até 1 dia útil.",
    },
    CannedResponse {
        keywords: &["solicitacao", "pedido", "servico"],
        answer: "Solicitações de serviço podem ser registradas na seção \"Solicitações\". Descreva o que você precisa e acompanharemos por lá.",
    },
    CannedResponse {
        keywords: &["acesso", "permissao", "usuario novo"],
        answer: "Pedidos de acesso e novos usuários são gerenciados pelo administrador da sua empresa. Abra uma solicitação de serviço se precisar de ajuda.",
    },
    CannedResponse {
        keywords: &["obrigado", "obrigada", "valeu"],
        answer: "De nada! Se precisar de mais alguma coisa, é só perguntar.",
    },
    CannedResponse {
        keywords: &["tchau", "ate logo", "adeus"],
        answer: "Até logo! Estarei por aqui se precisar.",
    },
];

const FALLBACK: &str = "Desculpe, não entendi sua pergunta. Você pode abrir um chamado de suporte e nossa equipe ajudará você.";

/// Pick the canned answer for a message. Deterministic: first entry whose
/// keyword occurs as a substring of the normalized message.
pub fn reply(message: &str) -> &'static str {
    let normalized = normalize(message);
    for canned in RESPONSES {
        if canned.keywords.iter().any(|k| normalized.contains(k)) {
            return canned.answer;
        }
    }
    FALLBACK
}

/// Lowercase and fold the accented characters common in Portuguese
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greets_in_portuguese() {
        assert!(reply("Olá, tudo bem?").contains("assistente virtual"));
        assert!(reply("bom dia").contains("assistente virtual"));
    }

    #[test]
    fn matching_ignores_case_and_accents() {
        assert_eq!(reply("PERDI MINHA SENHA"), reply("perdi minha senha"));
        assert_eq!(reply("solicitação de serviço"), reply("solicitacao de servico"));
    }

    #[test]
    fn support_keywords_route_to_tickets() {
        assert!(reply("estou com um problema no sistema").contains("chamado de suporte"));
        assert!(reply("quero abrir um ticket").contains("chamado de suporte"));
    }

    #[test]
    fn unmatched_messages_get_fallback() {
        assert_eq!(reply("xyzzy"), FALLBACK);
        assert_eq!(reply(""), FALLBACK);
    }

    #[test]
    fn first_match_wins() {
        // "ola" appears before "senha" in the list
        assert!(reply("ola, esqueci minha senha").contains("assistente virtual"));
    }
}
