use crate::qualification::domain::{evaluate_flag, DisqualificationFlag};
use crate::qualification::steps::{advance, node, validate_answer, StepId, ALL_STEPS};

#[test]
fn employment_branch_selects_matching_verification_step() {
    assert_eq!(
        advance(StepId::EmploymentStatus, "retired"),
        Some(StepId::VerifyIncomeRetired)
    );
    assert_eq!(
        advance(StepId::EmploymentStatus, "employed"),
        Some(StepId::VerifyIncomeEmployed)
    );
    assert_eq!(
        advance(StepId::EmploymentStatus, "self_employed"),
        Some(StepId::VerifyIncomeSelfEmployed)
    );
    assert_eq!(
        advance(StepId::EmploymentStatus, "not_employed"),
        Some(StepId::VerifyIncomeNotEmployed)
    );
}

#[test]
fn verification_branches_converge_on_income() {
    for id in [
        StepId::VerifyIncomeEmployed,
        StepId::VerifyIncomeSelfEmployed,
        StepId::VerifyIncomeNotEmployed,
        StepId::VerifyIncomeRetired,
    ] {
        assert_eq!(advance(id, "pay_stubs"), Some(StepId::GrossAnnualIncome));
    }
}

#[test]
fn every_non_terminal_step_names_a_successor() {
    for step in ALL_STEPS {
        if step.id == StepId::Summary {
            assert!(step.allowed_next.is_empty());
        } else {
            assert!(
                !step.allowed_next.is_empty(),
                "{} has no successor",
                step.id.as_str()
            );
        }
    }
}

#[test]
fn successors_are_declared_in_the_graph() {
    for step in ALL_STEPS {
        for next in step.allowed_next {
            assert!(
                ALL_STEPS.iter().any(|candidate| candidate.id == *next),
                "{} points at undeclared {}",
                step.id.as_str(),
                next.as_str()
            );
        }
    }
}

#[test]
fn step_ids_round_trip_through_strings() {
    for step in ALL_STEPS {
        assert_eq!(StepId::parse(step.id.as_str()), Some(step.id));
    }
    assert_eq!(StepId::parse("verify_income_retired"), Some(StepId::VerifyIncomeRetired));
    assert_eq!(StepId::parse("not_a_step"), None);
}

#[test]
fn choice_answers_must_match_an_option() {
    assert!(validate_answer(StepId::EmploymentStatus, "retired").is_ok());
    assert!(validate_answer(StepId::EmploymentStatus, "freelancer").is_err());
    assert!(validate_answer(StepId::GrossAnnualIncome, "52000").is_ok());
    assert!(validate_answer(StepId::GrossAnnualIncome, "lots").is_err());
    assert!(validate_answer(StepId::ContactName, "  ").is_err());
}

#[test]
fn disqualifying_answers_raise_flags() {
    assert_eq!(
        evaluate_flag(StepId::GrossAnnualIncome, "20000"),
        Some(DisqualificationFlag::LowIncome)
    );
    assert_eq!(evaluate_flag(StepId::GrossAnnualIncome, "52000"), None);
    assert_eq!(
        evaluate_flag(StepId::CurrentOnPayments, "no"),
        Some(DisqualificationFlag::BehindOnPayments)
    );
    assert_eq!(
        evaluate_flag(StepId::CreditScoreRange, "below_580"),
        Some(DisqualificationFlag::LowCreditScore)
    );
    assert_eq!(evaluate_flag(StepId::HomeUsage, "investment"), None);
}

#[test]
fn employment_prompt_lists_all_four_statuses() {
    let employment = node(StepId::EmploymentStatus);
    assert_eq!(employment.allowed_next.len(), 4);
}
