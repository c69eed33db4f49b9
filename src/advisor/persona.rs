/// Behavioral persona of a completion request. Each persona reads one text
/// pane and answers into the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    FinancialAdvisor,
    DataAnalyst,
    LegalConsultant,
}

impl Persona {
    pub const ALL: [Persona; 3] = [
        Persona::FinancialAdvisor,
        Persona::DataAnalyst,
        Persona::LegalConsultant,
    ];

    pub fn system_prompt(self) -> &'static str {
        match self {
            Persona::FinancialAdvisor => {
                "You are a financial advisor specializing in banking and loans. Provide detailed advice on financial transactions."
            }
            Persona::DataAnalyst => {
                "You are a data analyst focused on interpreting financial data and summaries. Provide insights based on numbers and trends."
            }
            Persona::LegalConsultant => {
                "You are a legal consultant for financial agreements. Provide guidance on contracts and obligations."
            }
        }
    }
    pub fn label(self) -> &'static str {
        match self {
            Persona::FinancialAdvisor => "Ask Financial Advisor (Agent 1)",
            Persona::DataAnalyst => "Ask Data Analyst (Agent 2)",
            Persona::LegalConsultant => "Ask Legal Consultant (Agent 3)",
        }
    }
    pub fn index(self) -> usize {
        match self {
            Persona::FinancialAdvisor => 0,
            Persona::DataAnalyst => 1,
            Persona::LegalConsultant => 2,
        }
    }
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
    pub fn source_pane(self) -> usize {
        self.index()
    }
    pub fn target_pane(self) -> usize {
        self.index() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panes_are_chained() {
        for p in Persona::ALL {
            assert_eq!(p.target_pane(), p.source_pane() + 1);
            assert_eq!(Persona::from_index(p.index()), Some(p));
        }
        assert_eq!(Persona::LegalConsultant.target_pane(), 3);
        assert_eq!(Persona::from_index(3), None);
    }
}
