use cashcycle_core::{compute_metrics, FinancialSnapshot};

use crate::cli::ComputeArgs;

use super::{CommandData, CommandResult};

pub fn run(args: &ComputeArgs) -> CommandResult {
    let input = FinancialSnapshot {
        revenue: args.revenue,
        cost_of_goods_sold: args.cogs,
        accounts_receivable: args.receivables,
        inventory: args.inventory,
        accounts_payable: args.payables,
    };
    let metrics = compute_metrics(&input);

    let missing = input.missing_fields();
    let result = CommandResult::ok(CommandData::Compute { input, metrics }, "offline");
    if missing.is_empty() {
        result
    } else {
        result.with_warning(format!("missing figures: {}", missing.join(", ")))
    }
}
