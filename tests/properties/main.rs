mod policy_props;
mod prior_props;
