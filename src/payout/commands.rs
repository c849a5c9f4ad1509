/// 정산 관련 커맨드 처리
/// 1. 계좌 등록 / 기본 계좌 지정 / 삭제
/// 2. 출금 신청
// region:    --- Imports
use super::model::{AccountType, BankAccount, SaleStatus, Withdrawal};
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

// region:    --- Bank Account Commands
/// 계좌 등록 명령
#[derive(Debug, Clone, Deserialize)]
pub struct AddBankAccountCommand {
    pub bank_name: String,
    pub branch_name: String,
    pub account_type: AccountType,
    pub account_number: String,
    pub account_holder: String,
}

impl AddBankAccountCommand {
    pub fn validate(&self) -> AppResult<()> {
        let fail = |message: &str| Err(AppError::Validation(message.to_string()));
        if self.bank_name.trim().is_empty() {
            return fail("銀行名を入力してください");
        }
        if self.branch_name.trim().is_empty() {
            return fail("支店名を入力してください");
        }
        let number = self.account_number.trim();
        if number.len() != 7 || !number.chars().all(|c| c.is_ascii_digit()) {
            return fail("口座番号は7桁の数字で入力してください");
        }
        if self.account_holder.trim().is_empty() {
            return fail("口座名義を入力してください");
        }
        Ok(())
    }
}

const BANK_ACCOUNT_COLUMNS: &str =
    "id, seller_id, bank_name, branch_name, account_type, account_number, account_holder, is_default, created_at";

/// 계좌 등록 (첫 계좌는 기본 계좌)
pub async fn add_bank_account(
    db_manager: &DatabaseManager,
    seller_id: &str,
    cmd: AddBankAccountCommand,
) -> AppResult<BankAccount> {
    cmd.validate()?;
    info!("{:<12} --> 계좌 등록: seller={}", "Command", seller_id);

    let seller_id = seller_id.to_string();
    let account = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // 같은 판매자의 동시 등록 직렬화
                sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                    .bind(&seller_id)
                    .execute(&mut **tx)
                    .await?;

                let has_default: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM bank_accounts WHERE seller_id = $1 AND is_default)",
                )
                .bind(&seller_id)
                .fetch_one(&mut **tx)
                .await?;

                sqlx::query_as::<_, BankAccount>(&format!(
                    "INSERT INTO bank_accounts (seller_id, bank_name, branch_name, account_type, account_number, account_holder, is_default)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)
                     RETURNING {BANK_ACCOUNT_COLUMNS}"
                ))
                .bind(&seller_id)
                .bind(cmd.bank_name.trim())
                .bind(cmd.branch_name.trim())
                .bind(cmd.account_type.as_str())
                .bind(cmd.account_number.trim())
                .bind(cmd.account_holder.trim())
                .bind(!has_default)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await?;

    Ok(account)
}

/// 기본 계좌 지정
pub async fn set_default_bank_account(
    db_manager: &DatabaseManager,
    seller_id: &str,
    account_id: i64,
) -> AppResult<BankAccount> {
    info!(
        "{:<12} --> 기본 계좌 지정: seller={}, account={}",
        "Command", seller_id, account_id
    );
    let seller_id = seller_id.to_string();
    let account = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let exists: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM bank_accounts WHERE id = $1 AND seller_id = $2)",
                )
                .bind(account_id)
                .bind(&seller_id)
                .fetch_one(&mut **tx)
                .await?;
                if !exists {
                    return Err(AppError::NotFound("口座"));
                }

                sqlx::query("UPDATE bank_accounts SET is_default = FALSE WHERE seller_id = $1 AND is_default")
                    .bind(&seller_id)
                    .execute(&mut **tx)
                    .await?;

                let account = sqlx::query_as::<_, BankAccount>(&format!(
                    "UPDATE bank_accounts SET is_default = TRUE WHERE id = $1 RETURNING {BANK_ACCOUNT_COLUMNS}"
                ))
                .bind(account_id)
                .fetch_one(&mut **tx)
                .await?;
                Ok(account)
            })
        })
        .await?;

    Ok(account)
}

/// 계좌 삭제 (기본 계좌를 지우면 가장 오래된 계좌가 기본 계좌)
pub async fn delete_bank_account(
    db_manager: &DatabaseManager,
    seller_id: &str,
    account_id: i64,
) -> AppResult<()> {
    info!(
        "{:<12} --> 계좌 삭제: seller={}, account={}",
        "Command", seller_id, account_id
    );
    let seller_id = seller_id.to_string();
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let in_use: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM withdrawals WHERE bank_account_id = $1)",
                )
                .bind(account_id)
                .fetch_one(&mut **tx)
                .await?;
                if in_use {
                    return Err(AppError::conflict(
                        "出金申請に使用された口座は削除できません",
                        "ACCOUNT_IN_USE",
                    ));
                }

                let was_default: Option<bool> = sqlx::query_scalar(
                    "DELETE FROM bank_accounts WHERE id = $1 AND seller_id = $2 RETURNING is_default",
                )
                .bind(account_id)
                .bind(&seller_id)
                .fetch_optional(&mut **tx)
                .await?;

                match was_default {
                    None => Err(AppError::NotFound("口座")),
                    Some(true) => {
                        sqlx::query(
                            "UPDATE bank_accounts SET is_default = TRUE
                             WHERE id = (SELECT id FROM bank_accounts WHERE seller_id = $1
                                         ORDER BY created_at ASC, id ASC LIMIT 1)",
                        )
                        .bind(&seller_id)
                        .execute(&mut **tx)
                        .await?;
                        Ok(())
                    }
                    Some(false) => Ok(()),
                }
            })
        })
        .await
}
// endregion: --- Bank Account Commands

// region:    --- Withdrawal Commands
/// 출금 신청 명령 (계좌를 생략하면 기본 계좌)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WithdrawCommand {
    #[serde(default)]
    pub bank_account_id: Option<i64>,
}

/// 출금 신청
/// 출금 가능(completed) 판매를 잠그고 합계를 한 번에 출금한다.
pub async fn request_withdrawal(
    db_manager: &DatabaseManager,
    seller_id: &str,
    cmd: WithdrawCommand,
) -> AppResult<Withdrawal> {
    info!("{:<12} --> 출금 신청: seller={}", "Command", seller_id);
    let seller_id = seller_id.to_string();
    let withdrawal = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let bank_account_id: Option<i64> = match cmd.bank_account_id {
                    Some(id) => sqlx::query_scalar(
                        "SELECT id FROM bank_accounts WHERE id = $1 AND seller_id = $2",
                    )
                    .bind(id)
                    .bind(&seller_id)
                    .fetch_optional(&mut **tx)
                    .await?,
                    None => sqlx::query_scalar(
                        "SELECT id FROM bank_accounts WHERE seller_id = $1 AND is_default",
                    )
                    .bind(&seller_id)
                    .fetch_optional(&mut **tx)
                    .await?,
                };
                let bank_account_id = bank_account_id.ok_or_else(|| {
                    AppError::Validation("振込先の口座を登録してください".to_string())
                })?;

                let sale_ids: Vec<(i64, i64)> = sqlx::query_as(
                    "SELECT id, net_amount FROM sales WHERE seller_id = $1 AND status = $2 FOR UPDATE",
                )
                .bind(&seller_id)
                .bind(SaleStatus::Completed.as_str())
                .fetch_all(&mut **tx)
                .await?;

                let amount: i64 = sale_ids.iter().map(|(_, net)| net).sum();
                if amount <= 0 {
                    return Err(AppError::Validation(
                        "出金可能な売上がありません".to_string(),
                    ));
                }

                let withdrawal = sqlx::query_as::<_, Withdrawal>(
                    "INSERT INTO withdrawals (seller_id, bank_account_id, amount)
                     VALUES ($1, $2, $3)
                     RETURNING id, seller_id, bank_account_id, amount, status, created_at",
                )
                .bind(&seller_id)
                .bind(bank_account_id)
                .bind(amount)
                .fetch_one(&mut **tx)
                .await?;

                let ids: Vec<i64> = sale_ids.iter().map(|(id, _)| *id).collect();
                sqlx::query("UPDATE sales SET status = $1, withdrawal_id = $2 WHERE id = ANY($3)")
                    .bind(SaleStatus::Withdrawn.as_str())
                    .bind(withdrawal.id)
                    .bind(&ids)
                    .execute(&mut **tx)
                    .await?;

                Ok(withdrawal)
            })
        })
        .await?;

    info!(
        "{:<12} --> 출금 신청 완료: id={}, amount={}",
        "Command", withdrawal.id, withdrawal.amount
    );
    Ok(withdrawal)
}
// endregion: --- Withdrawal Commands

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> AddBankAccountCommand {
        AddBankAccountCommand {
            bank_name: "三井住友銀行".into(),
            branch_name: "銀座支店".into(),
            account_type: AccountType::Ordinary,
            account_number: "0123456".into(),
            account_holder: "ヤマダ ハナコ".into(),
        }
    }

    #[test]
    fn valid_account_passes() {
        assert!(command().validate().is_ok());
    }

    #[test]
    fn account_number_must_be_seven_digits() {
        for bad in ["123456", "12345678", "12a4567", ""] {
            let mut cmd = command();
            cmd.account_number = bad.into();
            assert!(cmd.validate().is_err(), "number {bad:?}");
        }
    }

    #[test]
    fn names_are_required() {
        let mut cmd = command();
        cmd.account_holder = " ".into();
        assert!(cmd.validate().is_err());

        let mut cmd = command();
        cmd.bank_name.clear();
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn account_type_deserializes_lowercase() {
        let parsed: AccountType = serde_json::from_str("\"checking\"").unwrap();
        assert_eq!(parsed, AccountType::Checking);
    }
}
// endregion: --- Tests
